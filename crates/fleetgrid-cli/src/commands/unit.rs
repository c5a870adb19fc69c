use fleetgrid_lifecycle::{CreateOptions, LifecycleError};

use super::Session;

pub async fn create(
    session: &mut Session,
    name: &str,
    image: &str,
    command: &str,
    tags: Vec<(String, String)>,
    entrypoint: Option<String>,
    start: bool,
) -> anyhow::Result<()> {
    let mut merged = session.config.tags.clone();
    merged.extend(tags);

    let options = CreateOptions {
        resources: session.config.resources.clone(),
        tags: merged,
        entrypoint,
    };
    session
        .manager
        .create(name, image, command, None, &options)
        .await?;
    println!("✓ Created {name}");

    if start {
        session.manager.start(name).await?;
        println!("✓ Started {name}");
    }
    Ok(())
}

pub async fn start(session: &mut Session, name: &str) -> anyhow::Result<()> {
    session.manager.start(name).await?;
    println!("✓ Started {name}");
    Ok(())
}

/// Fails without opening the scheduler socket; there is nothing to stop.
pub fn stop(name: &str) -> anyhow::Result<()> {
    Err(anyhow::Error::new(LifecycleError::NotSupported { operation: "stop" })
        .context(format!("cannot stop {name}")))
}

pub async fn destroy(session: &mut Session, name: &str) -> anyhow::Result<()> {
    session.manager.destroy(name).await?;
    println!("✓ Destroyed {name}");
    Ok(())
}

pub async fn run(
    session: &mut Session,
    name: &str,
    image: &str,
    entrypoint: &str,
    command: &str,
) -> anyhow::Result<()> {
    let run_id = session.manager.run(name, image, entrypoint, command).await?;
    println!("{run_id}");
    Ok(())
}

pub fn attach(name: &str) -> anyhow::Result<()> {
    Err(anyhow::Error::new(LifecycleError::NotSupported { operation: "attach" })
        .context(format!("cannot attach to {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_supported(result: anyhow::Result<()>) -> &'static str {
        match result.unwrap_err().downcast_ref::<LifecycleError>() {
            Some(LifecycleError::NotSupported { operation }) => *operation,
            other => panic!("expected NotSupported, got {other:?}"),
        }
    }

    #[test]
    fn stop_and_attach_fail_without_a_scheduler() {
        assert_eq!(not_supported(stop("app.web.1")), "stop");
        assert_eq!(not_supported(attach("app.web.1")), "attach");
    }
}
