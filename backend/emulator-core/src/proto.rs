// Generated clients for the emulator's gRPC services
// (package: android.emulation.control)
pub mod control {
    tonic::include_proto!("android.emulation.control");
}
