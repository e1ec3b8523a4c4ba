//! Protocol tests against the in-memory thermostat.
//!
//! These exercise the public API end to end without BLE hardware:
//! `cargo test --package radiator-core --test session_operations`

use radiator_core::gatt::{CONTROL_RECORD_HANDLE, LOGIN_HANDLE};
use radiator_core::{
    CharacteristicHandle, Error, ErrorKind, FirmwareProfile, MockCall, MockConnector,
    MockFailure, Pin, Session, get_state, set_state,
};

const ADDRESS: &str = "AA:BB:CC:DD:EE:FF";
const PIN: Pin = Pin::new(123456);

fn connector() -> MockConnector {
    MockConnector::builder()
        .pin(PIN)
        .with_record(&[40, 42, 20, 28, 5, 10, 15])
        .build()
}

#[tokio::test]
async fn test_read_modify_read() {
    let connector = connector();
    let session = Session::prepare(&connector, ADDRESS, PIN).await.unwrap();

    let before = get_state(&session).await.unwrap();
    assert_eq!(before.manual_setpoint, 21.0);
    assert_eq!(before.calibration_offset, 2.5);

    set_state(&session, Some(22.5), Some(1.0)).await.unwrap();

    let after = get_state(&session).await.unwrap();
    assert_eq!(after.current_temperature, 20.0);
    assert_eq!(after.manual_setpoint, 22.5);
    assert_eq!(after.low_auto_setpoint, 22.5);
    assert_eq!(after.high_auto_setpoint, 22.5);
    assert_eq!(after.calibration_offset, 1.0);
    assert_eq!(after.open_window_interval, 10);
    assert_eq!(after.open_window_duration, 15);

    session.close().await.unwrap();
    assert!(!connector.is_connected().await);
}

#[tokio::test]
async fn test_call_sequence() {
    let connector = connector();
    let session = Session::prepare(&connector, ADDRESS, PIN).await.unwrap();
    set_state(&session, Some(21.0), None).await.unwrap();
    session.close().await.unwrap();

    assert_eq!(
        connector.calls().await,
        vec![
            MockCall::Connect(ADDRESS.into()),
            MockCall::Characteristic(LOGIN_HANDLE),
            MockCall::Write {
                handle: LOGIN_HANDLE,
                data: PIN.to_le_bytes().to_vec(),
                with_response: true,
            },
            MockCall::Characteristic(CONTROL_RECORD_HANDLE),
            MockCall::Write {
                handle: CONTROL_RECORD_HANDLE,
                data: vec![128, 42, 42, 42, 128, 128, 128],
                with_response: true,
            },
            MockCall::Disconnect,
        ]
    );
}

#[tokio::test]
async fn test_negative_offset_wire_byte() {
    let connector = connector();
    let session = Session::prepare(&connector, ADDRESS, PIN).await.unwrap();

    session.set_state(None, Some(-2.5)).await.unwrap();
    assert_eq!(connector.current_record().await[4], 251);

    let record = session.get_state().await.unwrap();
    assert_eq!(record.calibration_offset, 125.5);
    assert_eq!(record.calibration_offset_signed(), -2.5);

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_wrong_pin_leaves_device_untouched() {
    let connector = connector();
    let err = Session::prepare(&connector, ADDRESS, Pin::new(1))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Auth);
    assert!(!connector.is_connected().await);
    let calls = connector.calls().await;
    assert!(!calls.contains(&MockCall::Characteristic(CONTROL_RECORD_HANDLE)));
    assert!(!calls.iter().any(|c| matches!(c, MockCall::Read(_))));
    assert_eq!(connector.current_record().await, vec![40, 42, 20, 28, 5, 10, 15]);
}

#[tokio::test]
async fn test_rejected_request_touches_nothing() {
    let connector = connector();
    let session = Session::prepare(&connector, ADDRESS, PIN).await.unwrap();
    connector.clear_calls().await;

    for (temperature, offset) in [(None, None), (Some(-1.0), None), (None, Some(f64::NAN))] {
        let err = session.set_state(temperature, offset).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }
    assert!(connector.calls().await.is_empty());

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_malformed_record() {
    let connector = MockConnector::builder()
        .pin(PIN)
        .with_record(&[40, 42, 20, 28, 5, 10, 15, 0])
        .build();
    let session = Session::prepare(&connector, ADDRESS, PIN).await.unwrap();

    let err = session.get_state().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Read);
    assert!(err.transport_cause().is_none());

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_lookup_failure_vs_missing() {
    let failing = MockConnector::builder()
        .pin(PIN)
        .fail(MockFailure::Lookup(CONTROL_RECORD_HANDLE))
        .build();
    let session = Session::prepare(&failing, ADDRESS, PIN).await.unwrap();
    let err = session.get_state().await.unwrap_err();
    assert!(matches!(err, Error::CharacteristicLookup { .. }));
    assert_eq!(err.kind(), ErrorKind::CharacteristicNotFound);
    session.close().await.unwrap();

    let missing = MockConnector::builder()
        .pin(PIN)
        .without_characteristic(CONTROL_RECORD_HANDLE)
        .build();
    let session = Session::prepare(&missing, ADDRESS, PIN).await.unwrap();
    let err = session.get_state().await.unwrap_err();
    assert!(matches!(err, Error::CharacteristicNotFound { .. }));
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_custom_profile() {
    let profile = FirmwareProfile::default()
        .login_handle(CharacteristicHandle::new(72))
        .control_handle(CharacteristicHandle::new(64));
    let connector = MockConnector::builder()
        .pin(PIN)
        .profile(profile)
        .build();

    // The default handles do not exist on this firmware.
    let err = Session::prepare(&connector, ADDRESS, PIN).await.unwrap_err();
    assert!(matches!(err, Error::CharacteristicNotFound { handle } if handle == LOGIN_HANDLE));

    let session = Session::prepare_with_profile(&connector, ADDRESS, PIN, profile)
        .await
        .unwrap();
    session.set_state(Some(19.0), None).await.unwrap();
    assert_eq!(session.get_state().await.unwrap().manual_setpoint, 19.0);
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_reconnect_requires_new_login() {
    let connector = connector();

    let first = Session::prepare(&connector, ADDRESS, PIN).await.unwrap();
    first.close().await.unwrap();
    assert!(!connector.is_logged_in().await);

    let second = Session::prepare(&connector, ADDRESS, PIN).await.unwrap();
    assert!(connector.is_logged_in().await);
    assert_eq!(second.get_state().await.unwrap().manual_setpoint, 21.0);
    second.close().await.unwrap();
}
