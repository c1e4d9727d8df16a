//! Drives a task tree by hand while [`UpdateRenderer`] repaints it.
//!
//! A worker thread walks through a small release pipeline, updating task
//! states and output. The main thread only starts and ends the renderer.

use std::time::Duration;

use tally_update::*;

fn main() -> Result<()> {
    let tasks = TaskStore::shared();
    let (build, test, unit, integration, publish) = {
        let mut store = TaskStore::lock(&tasks);
        let build = store.add(None, "Build");
        let test = store.add(None, "Test");
        let unit = store.add(Some(test), "Unit tests");
        let integration = store.add(Some(test), "Integration tests");
        let publish = store.add(None, "Publish");
        (build, test, unit, integration, publish)
    };

    let mut renderer = UpdateRenderer::new(tasks.clone(), RenderOptions::default());
    renderer.render()?;

    let worker = std::thread::spawn(move || {
        let step = |id, state| TaskStore::lock(&tasks).set_state(id, state);
        let say = |id, text: &str| TaskStore::lock(&tasks).set_output(id, text);

        step(build, TaskState::Pending);
        for line in ["resolving dependencies", "compiling 42 crates", "linking"] {
            say(build, line);
            sleep(600);
        }
        step(build, TaskState::Succeeded);

        step(test, TaskState::Pending);
        step(unit, TaskState::Pending);
        for n in 1..=5 {
            say(unit, &format!("running suite {n}/5"));
            sleep(300);
        }
        step(unit, TaskState::Succeeded);
        step(integration, TaskState::Pending);
        say(integration, "starting database\nwaiting for port 5432");
        sleep(1200);
        step(integration, TaskState::Succeeded);
        step(test, TaskState::Succeeded);

        step(publish, TaskState::Skipped);
        say(publish, "dry run, nothing to publish");
        sleep(300);
    });

    match worker.join() {
        Ok(()) => renderer.end(None),
        Err(_) => renderer.end(Some(&std::io::Error::other("pipeline worker panicked"))),
    }
}

fn sleep(ms: u64) {
    std::thread::sleep(Duration::from_millis(ms));
}
