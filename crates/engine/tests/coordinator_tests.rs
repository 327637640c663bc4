use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use mdb_common::DebuggerConfig;
use mdb_engine::{
    test_utils::{spawn_control_thread, InMemoryDebuggee, StaticCompileContext},
    BinaryExpressionEvaluator, BinaryOperator, DebuggeeThread, DebuggeeValueFactory, ElementKind,
    ErrorSink, EvalCoordinator, EvalError, EvalOutcome, EvalSession, ExpressionEvaluator,
    LiteralEvaluator, LiveCall, LiveCallEvaluator, LiveCallFault, ObjectAddress, Primitive,
    RemoteValue, SessionState, TypeSignature,
};
use tracing::info;

fn int_type() -> TypeSignature {
    TypeSignature::of(ElementKind::I32)
}

#[test]
fn test_live_call_through_control_thread() {
    mdb_common::logging::ensure_test_logging(None);
    info!("Running test");
    let debuggee = Arc::new(
        InMemoryDebuggee::new().with_call("get_Count", Ok(RemoteValue::Primitive(Primitive::I32(12)))),
    );
    let session = Arc::new(EvalSession::new(DebuggeeThread(7), &DebuggerConfig::default()));
    let control = spawn_control_thread(session.clone(), debuggee.clone());

    let context = StaticCompileContext::new().with_call("get_Count", int_type());
    let mut expr = BinaryExpressionEvaluator::new(
        BinaryOperator::Gt,
        Box::new(LiveCallEvaluator::new("get_Count")),
        Box::new(LiteralEvaluator::primitive(10i32)),
    );
    let factory = DebuggeeValueFactory::new(debuggee.clone());
    let mut sink = ErrorSink::new();
    expr.compile(&context, &mut sink).unwrap();

    let value = expr.evaluate(session.as_ref(), &factory, &mut sink).unwrap();
    assert!(value.as_bool().unwrap());
    assert_eq!(session.state(), SessionState::Idle);

    session.signal_ready();
    session.close();
    assert_eq!(control.join().unwrap(), 1);
    assert_eq!(debuggee.executed(), vec![(DebuggeeThread(7), "get_Count".to_string())]);
}

#[test]
fn test_live_string_result_is_read_lazily() {
    mdb_common::logging::ensure_test_logging(None);
    info!("Running test");
    let debuggee = Arc::new(
        InMemoryDebuggee::new()
            .with_string(ObjectAddress(0x40), "Contoso")
            .with_call("get_Name", Ok(RemoteValue::String(ObjectAddress(0x40)))),
    );
    let session = Arc::new(EvalSession::new(DebuggeeThread(1), &DebuggerConfig::default()));
    let control = spawn_control_thread(session.clone(), debuggee.clone());

    let context =
        StaticCompileContext::new().with_call("get_Name", TypeSignature::of(ElementKind::String));
    let mut expr = BinaryExpressionEvaluator::new(
        BinaryOperator::Eq,
        Box::new(LiveCallEvaluator::new("get_Name")),
        Box::new(LiteralEvaluator::string("Contoso")),
    );
    let factory = DebuggeeValueFactory::new(debuggee.clone());
    let mut sink = ErrorSink::new();
    expr.compile(&context, &mut sink).unwrap();
    assert_eq!(debuggee.string_reads(), 0);

    let value = expr.evaluate(session.as_ref(), &factory, &mut sink).unwrap();
    assert!(value.as_bool().unwrap());
    assert_eq!(debuggee.string_reads(), 1);

    session.close();
    control.join().unwrap();
}

#[test]
fn test_second_request_never_runs_concurrently() {
    mdb_common::logging::ensure_test_logging(None);
    info!("Running test");
    let session = Arc::new(EvalSession::new(DebuggeeThread(1), &DebuggerConfig::default()));
    let first = session.request_eval(LiveCall::new("get_First")).unwrap();

    // Racing requests from other threads are all rejected while the first is outstanding.
    let rejected = Arc::new(AtomicUsize::new(0));
    let racers: Vec<_> = (0..4)
        .map(|i| {
            let session = session.clone();
            let rejected = rejected.clone();
            thread::spawn(move || {
                let err = session.request_eval(LiveCall::new(format!("get_{i}"))).unwrap_err();
                assert_eq!(err, EvalError::EvalInProgress);
                rejected.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();
    for racer in racers {
        racer.join().unwrap();
    }
    assert_eq!(rejected.load(Ordering::SeqCst), 4);

    let (handle, call) = session.wait_for_request(Some(Duration::ZERO)).unwrap();
    assert_eq!(handle, first);
    assert_eq!(call.target, "get_First");
    session.finish_eval(handle, mdb_engine::DebugValue::primitive(1i32)).unwrap();
    session.wait_for_eval(handle).unwrap();

    // Once the outcome is consumed the next request is accepted.
    assert!(session.request_eval(LiveCall::new("get_Second")).is_ok());
}

#[test]
fn test_stuck_evaluation_times_out() {
    mdb_common::logging::ensure_test_logging(None);
    info!("Running test");
    let debuggee = Arc::new(
        InMemoryDebuggee::new()
            .with_call("get_Slow", Ok(RemoteValue::Primitive(Primitive::I32(1))))
            .with_call_delay(Duration::from_millis(300)),
    );
    let config = DebuggerConfig::default().with_eval_timeout_ms(100);
    let session = Arc::new(EvalSession::new(DebuggeeThread(1), &config));
    let control = spawn_control_thread(session.clone(), debuggee.clone());

    let context = StaticCompileContext::new().with_call("get_Slow", int_type());
    let mut call = LiveCallEvaluator::new("get_Slow");
    let factory = DebuggeeValueFactory::new(debuggee.clone());
    let mut sink = ErrorSink::new();
    call.compile(&context, &mut sink).unwrap();

    let err = call.evaluate(session.as_ref(), &factory, &mut sink).unwrap_err();
    assert!(matches!(err, EvalError::EvalFault(_)), "{err:?}");
    assert_eq!(sink.messages().len(), 1);
    assert_eq!(debuggee.executed().len(), 1);

    // The debuggee thread is still running the call, so the session stays busy.
    let err = session.request_eval(LiveCall::new("get_Slow")).unwrap_err();
    assert_eq!(err, EvalError::EvalInProgress);

    // Its late completion frees the session without reaching anyone.
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while session.state() != SessionState::Idle {
        assert!(std::time::Instant::now() < deadline, "late completion never arrived");
        thread::sleep(Duration::from_millis(10));
    }
    session.close();
    assert_eq!(control.join().unwrap(), 1);
    assert_eq!(debuggee.executed().len(), 1);
}

#[test]
fn test_thrown_exception_is_a_fault() {
    mdb_common::logging::ensure_test_logging(None);
    info!("Running test");
    let exception_ty = TypeSignature::class("System.InvalidOperationException");
    let debuggee = Arc::new(InMemoryDebuggee::new().with_call(
        "get_Current",
        Err(LiveCallFault::Exception(RemoteValue::Object {
            address: ObjectAddress(0x90),
            ty: exception_ty.clone(),
        })),
    ));
    let session = EvalSession::new(DebuggeeThread(1), &DebuggerConfig::default());
    let factory = DebuggeeValueFactory::new(debuggee.clone());

    let handle = session.request_eval(LiveCall::new("get_Current")).unwrap();
    assert!(session.serve_one(debuggee.as_ref(), &factory, Some(Duration::ZERO)).unwrap());
    match session.wait_for_eval(handle).unwrap() {
        EvalOutcome::Threw(exception) => assert_eq!(exception.static_type(), exception_ty),
        other => panic!("unexpected outcome: {other:?}"),
    }

    // Through an evaluator the exception surfaces as a fault naming its type.
    let control = {
        let session = Arc::new(session);
        let handle = spawn_control_thread(session.clone(), debuggee.clone());
        (session, handle)
    };
    let context = StaticCompileContext::new().with_call("get_Current", int_type());
    let mut call = LiveCallEvaluator::new("get_Current");
    let mut sink = ErrorSink::new();
    call.compile(&context, &mut sink).unwrap();
    let err = call.evaluate(control.0.as_ref(), &factory, &mut sink).unwrap_err();
    assert!(err.to_string().contains("System.InvalidOperationException"), "{err}");

    control.0.close();
    control.1.join().unwrap();
}

#[test]
fn test_native_failure_is_a_fault() {
    mdb_common::logging::ensure_test_logging(None);
    info!("Running test");
    let debuggee = Arc::new(InMemoryDebuggee::new());
    let session = EvalSession::new(DebuggeeThread(1), &DebuggerConfig::default());
    let factory = DebuggeeValueFactory::new(debuggee.clone());

    let handle = session.request_eval(LiveCall::new("get_Missing")).unwrap();
    assert!(session.serve_one(debuggee.as_ref(), &factory, Some(Duration::ZERO)).unwrap());
    let err = session.wait_for_eval(handle).unwrap_err();
    assert!(matches!(err, EvalError::EvalFault(ref reason) if reason.contains("get_Missing")));
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn test_disabled_property_evaluation_fails_fast() {
    mdb_common::logging::ensure_test_logging(None);
    info!("Running test");
    let config = DebuggerConfig::default().with_property_evaluation(false);
    let session = EvalSession::new(DebuggeeThread(1), &config);
    let factory = DebuggeeValueFactory::detached();

    let context = StaticCompileContext::new().with_call("get_Count", int_type());
    let mut call = LiveCallEvaluator::new("get_Count");
    let mut sink = ErrorSink::new();
    call.compile(&context, &mut sink).unwrap();

    let err = call.evaluate(&session, &factory, &mut sink).unwrap_err();
    assert!(matches!(err, EvalError::NotSupported(_)));
    assert!(!session.waiting_for_eval());
    assert_eq!(session.state(), SessionState::Idle);

    session.set_property_evaluation(true);
    assert!(session.property_evaluation_enabled());
}

#[test]
fn test_unresolved_call_type_fails_compile() {
    mdb_common::logging::ensure_test_logging(None);
    info!("Running test");
    let mut call = LiveCallEvaluator::new("get_Unknown");
    let mut sink = ErrorSink::new();
    let err = call.compile(&StaticCompileContext::new(), &mut sink).unwrap_err();
    assert!(err.is_compile_error());
    assert!(sink.to_string().contains("get_Unknown"));

    let session = EvalSession::new(DebuggeeThread(1), &DebuggerConfig::default());
    let err = call
        .evaluate(&session, &DebuggeeValueFactory::detached(), &mut ErrorSink::new())
        .unwrap_err();
    assert_eq!(err, EvalError::NotCompiled);
}

#[test]
fn test_ready_rendezvous() {
    mdb_common::logging::ensure_test_logging(None);
    info!("Running test");
    let session = Arc::new(EvalSession::new(DebuggeeThread(1), &DebuggerConfig::default()));

    let control = {
        let session = session.clone();
        thread::spawn(move || session.wait_for_ready(Some(Duration::from_secs(5))))
    };
    thread::sleep(Duration::from_millis(10));
    session.signal_ready();

    assert!(control.join().unwrap());
}

#[test]
fn test_active_thread_follows_switch() {
    mdb_common::logging::ensure_test_logging(None);
    info!("Running test");
    let debuggee = Arc::new(
        InMemoryDebuggee::new().with_call("get_Id", Ok(RemoteValue::Primitive(Primitive::I32(3)))),
    );
    let session = EvalSession::new(DebuggeeThread(1), &DebuggerConfig::default());
    let factory = DebuggeeValueFactory::new(debuggee.clone());
    assert_eq!(session.active_thread(), Some(DebuggeeThread(1)));

    session.set_active_thread(DebuggeeThread(9));
    let handle = session.request_eval(LiveCall::new("get_Id")).unwrap();
    session.serve_one(debuggee.as_ref(), &factory, Some(Duration::ZERO)).unwrap();
    session.wait_for_eval(handle).unwrap();

    assert_eq!(debuggee.executed(), vec![(DebuggeeThread(9), "get_Id".to_string())]);
}
