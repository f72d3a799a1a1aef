mod emulator_info;
