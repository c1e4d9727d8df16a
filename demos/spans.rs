//! Renders `tracing` spans as a live task tree.
//!
//! [`TaskLayer`] turns each span into a task and each event into task
//! output. An `error!` inside a span marks it failed.

use std::time::Duration;

use tally_update::*;
use tracing::{error, info, info_span};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> Result<()> {
    let tasks = TaskStore::shared();
    tracing_subscriber::registry()
        .with(TaskLayer::new(tasks.clone()))
        .init();

    let mut renderer = UpdateRenderer::new(tasks, RenderOptions::default().collapse(false));
    renderer.render()?;

    let fetch = info_span!("fetch", message = "Fetch sources");
    let check = info_span!("check", message = "Check");
    let deploy = info_span!("deploy", message = "Deploy");

    fetch.in_scope(|| {
        for repo in ["core", "cli", "docs"] {
            info!("cloning {repo}");
            sleep(400);
        }
    });

    check.in_scope(|| {
        for lint in ["fmt", "clippy"] {
            info_span!("lint", message = lint).in_scope(|| {
                info!("running {lint}");
                sleep(500);
            });
        }
    });

    deploy.in_scope(|| {
        info!("uploading artifacts");
        sleep(700);
        error!("upload rejected: quota exceeded");
    });
    drop((fetch, check, deploy));

    renderer.end(Some(&std::io::Error::other("deploy failed")))
}

fn sleep(ms: u64) {
    std::thread::sleep(Duration::from_millis(ms));
}
