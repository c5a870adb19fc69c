use fleetgrid_client::{Machine, UnitState};

use super::Session;

pub async fn status(session: &mut Session, name: Option<&str>, format: &str) -> anyhow::Result<()> {
    let states = session.manager.state(name).await?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&states)?);
        }
        _ => {
            print!("{}", format_states(&states));
        }
    }
    Ok(())
}

pub async fn machines(session: &mut Session, format: &str) -> anyhow::Result<()> {
    let machines = session.manager.machines().await?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&machines)?);
        }
        _ => {
            print!("{}", format_machines(&machines));
        }
    }
    Ok(())
}

fn format_states(states: &[UnitState]) -> String {
    if states.is_empty() {
        return "no units\n".to_string();
    }
    let mut out = format!("{:<40} {:<36} {:<10} {}\n", "UNIT", "MACHINE", "ACTIVE", "SUB");
    for s in states {
        out.push_str(&format!(
            "{:<40} {:<36} {:<10} {}\n",
            s.name, s.machine_id, s.systemd_active_state, s.systemd_sub_state
        ));
    }
    out
}

fn format_machines(machines: &[Machine]) -> String {
    if machines.is_empty() {
        return "no machines\n".to_string();
    }
    let mut out = format!("{:<36} {:<16} {}\n", "MACHINE", "IP", "METADATA");
    for m in machines {
        let mut metadata: Vec<String> = m.metadata.iter().map(|(k, v)| format!("{k}={v}")).collect();
        metadata.sort();
        out.push_str(&format!("{:<36} {:<16} {}\n", m.id, m.primary_ip, metadata.join(",")));
    }
    out
}
