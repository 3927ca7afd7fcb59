use oxgit_core::object::Attribution;

mod refs;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn person(timestamp: i64) -> Attribution {
    Attribution::new("A U Thor", "author@example.com", timestamp, 0)
}
