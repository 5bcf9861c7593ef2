pub fn init_logger() {
    #[allow(unused_must_use)]
    env_logger::try_init();
}
