fn main() {
    tonic_build::configure()
        .build_server(false)
        .compile_protos(
            &[
                "../../proto/emulator_controller.proto",
                "../../proto/snapshot_service.proto",
                "../../proto/ui_controller_service.proto",
                "../../proto/vhci_forwarding_service.proto",
            ],
            &["../../proto"],
        )
        .unwrap();
}
