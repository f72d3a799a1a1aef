use crate::{EmulatorInfoBuilder, ModelError};

/// **VALUE**: Verifies that builder validation rejects zero PIDs.
///
/// **WHY THIS MATTERS**: PID 0 is an invalid process ID on all platforms.
/// Allowing it would break liveness checks and registry keying throughout
/// the system.
///
/// **BUG THIS CATCHES**: Would catch if the PID zero check is deleted
/// during refactoring, letting invalid records enter the registry.
#[test]
fn given_zero_pid_when_building_emulator_info_then_returns_validation_error() {
    // GIVEN: Builder with PID set to zero
    let builder = EmulatorInfoBuilder::default().with_pid(0).with_grpc_port(8554);

    // WHEN: Attempting to build
    let result = builder.build();

    // THEN: Should return validation error
    assert!(result.is_err());
    match result.unwrap_err() {
        ModelError::Validation { message, .. } => {
            assert_eq!(message, "PID must be non-zero");
        }
    }
}

/// **VALUE**: Verifies that builder validation rejects missing gRPC ports.
///
/// **WHY THIS MATTERS**: A record is only usable if the endpoint port is
/// known; the metadata parser relies on the builder to enforce this.
///
/// **BUG THIS CATCHES**: Would catch if the required-port validation is
/// removed, producing records no channel can ever be built from.
#[test]
fn given_missing_grpc_port_when_building_then_returns_validation_error() {
    // GIVEN: Builder without a gRPC port
    let builder = EmulatorInfoBuilder::default().with_pid(1234);

    // WHEN: Attempting to build
    let result = builder.build();

    // THEN: Should return validation error
    assert!(result.is_err());
    match result.unwrap_err() {
        ModelError::Validation { message, .. } => {
            assert_eq!(message, "gRPC port is required");
        }
    }
}

/// **VALUE**: Verifies that a minimal record builds with every optional
/// field absent.
///
/// **WHY THIS MATTERS**: Real metadata files frequently contain only
/// `grpc.port`; optional fields must default to absent without
/// invalidating the record.
#[test]
fn given_minimal_fields_when_building_then_optionals_default_to_absent() {
    // GIVEN: Only the required fields
    let info = EmulatorInfoBuilder::default()
        .with_pid(1234)
        .with_grpc_port(8554)
        .build()
        .expect("minimal record should build");

    // THEN: Optionals are absent and derived accessors behave
    assert!(info.grpc_token.is_none());
    assert!(info.grpc_use_tls.is_none());
    assert!(!info.requires_tls());
    assert!(!info.requires_token());
    assert_eq!(info.name(), None);
}

/// **VALUE**: Verifies adb-style name synthesis prefers the console port.
///
/// **BUG THIS CATCHES**: Would catch a swap of the serial/adb preference,
/// which would rename every device visible to callers.
#[test]
fn given_serial_and_adb_ports_when_naming_then_serial_port_wins() {
    // GIVEN: A record with both ports published
    let info = EmulatorInfoBuilder::default()
        .with_pid(1)
        .with_grpc_port(8554)
        .with_serial_port(5554)
        .with_adb_port(5555)
        .build()
        .expect("record should build");

    // THEN: The console port names the device
    assert_eq!(info.name().as_deref(), Some("emulator-5554"));
}

/// **VALUE**: Verifies the adb port names the device when no console port
/// is published.
#[test]
fn given_only_adb_port_when_naming_then_adb_port_is_used() {
    let info = EmulatorInfoBuilder::default()
        .with_pid(1)
        .with_grpc_port(8554)
        .with_adb_port(5554)
        .build()
        .expect("record should build");

    assert_eq!(info.name().as_deref(), Some("emulator-5554"));
}

/// **VALUE**: Verifies the access token never leaks through Debug output.
///
/// **WHY THIS MATTERS**: Discovery records are logged at debug level; a
/// Debug impl that prints the token would put credentials in log files.
#[test]
fn given_record_with_token_when_debug_formatted_then_token_is_redacted() {
    let info = EmulatorInfoBuilder::default()
        .with_pid(1)
        .with_grpc_port(8554)
        .with_grpc_token("super-secret")
        .build()
        .expect("record should build");

    let rendered = format!("{info:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("REDACTED"));
}
