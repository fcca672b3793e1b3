use std::sync::{Arc, mpsc::channel};

use loggroup::{Level, LogFile, LogStream, group_config};

fn main() {
    // main group logs to stderr, closed streams are reported through it
    let main = Arc::new(group_config().with_level(Level::Info).with_prefix("main").build());
    main.info("Hello, world!");
    // worker streams log to a shared file
    std::fs::remove_file("/tmp/loggroup_workers.log").ok();
    let reporter = main.clone();
    let workers = Arc::new(
        group_config()
            .with_level(Level::Debug)
            .with_output(LogFile::new("/tmp/loggroup_workers.log").unwrap())
            .with_close_handler(move |stream| {
                loggroup::info!(
                    reporter,
                    "stream {} closed after {} rows",
                    stream.id(),
                    stream.sequence().len()
                )
            })
            .build(),
    );
    let (handles, senders): (Vec<_>, Vec<_>) = (0..5)
        .map(|i| {
            let (sender, receiver) = channel::<&'static str>();
            let workers = workers.clone();
            (
                std::thread::spawn(move || {
                    let stream = workers.new_stream();
                    stream.set_prefix(&format!("thread {i}"));
                    for message in receiver {
                        loggroup::warn!(stream, "MESSAGE RECEIVED: {message}");
                    }
                    stream.close();
                }),
                sender,
            )
        })
        .unzip();
    for sender in senders {
        sender.send("Hello, world!").unwrap();
    }
    for handle in handles {
        handle.join().unwrap();
    }
    main.info(format!(
        "last line of /tmp/loggroup_workers.log is:\n\t{}",
        std::fs::read_to_string("/tmp/loggroup_workers.log")
            .unwrap()
            .trim_end()
            .lines()
            .last()
            .unwrap()
    ));
    main.close();
}
