//! Backend probes: `ping` and the built-in `selftest`.

use anyhow::Result;
use console::style;

use taskdeck::client::BoardApi;
use taskdeck::config::ApiConfig;
use taskdeck::models::TaskPatch;

pub async fn cmd_ping(config: &ApiConfig, api: &dyn BoardApi) -> Result<()> {
    let pong = api.ping().await?;
    let mode = pong.mode.as_deref().unwrap_or(if config.mock {
        "mock"
    } else {
        "live"
    });
    println!(
        "{} mode={} base_url={}",
        style("Backend reachable.").green(),
        style(mode).bold(),
        config.base_url
    );
    Ok(())
}

fn report(name: &str, result: &Result<String, String>) {
    match result {
        Ok(detail) if detail.is_empty() => println!("  {} {}", style("✔").green(), name),
        Ok(detail) => println!("  {} {} — {}", style("✔").green(), name, style(detail).dim()),
        Err(e) => println!("  {} {} — {}", style("✖").red(), name, style(e).red()),
    }
}

/// Configuration checks plus a live exercise of the seeded demo flow.
/// Mutating steps only run against the simulated backend.
pub async fn cmd_selftest(config: &ApiConfig, api: &dyn BoardApi) -> Result<()> {
    println!(
        "Mode: {} | base_url: {}",
        style(if config.mock { "mock" } else { "live" }).bold(),
        config.base_url
    );

    let mut failures = 0usize;
    let mut check = |name: &str, result: Result<String, String>| {
        report(name, &result);
        if result.is_err() {
            failures += 1;
        }
    };

    check(
        "config.base_url",
        if config.base_url.is_empty() {
            Err("empty".into())
        } else {
            Ok(String::new())
        },
    );

    check(
        "ping",
        api.ping()
            .await
            .map(|p| format!("ok={}", p.ok))
            .map_err(|e| e.to_string()),
    );

    if !config.mock {
        println!(
            "  {} remaining checks need the simulated backend (API_MOCK=1)",
            style("‣ skipped:").yellow()
        );
        if failures > 0 {
            anyhow::bail!("{} selftest check(s) failed", failures);
        }
        return Ok(());
    }

    check(
        "login owner@example.com",
        api.authenticate("owner@example.com", "1234")
            .await
            .map_err(|e| e.to_string())
            .and_then(|token| {
                if token == "mock-token-1" {
                    Ok(token)
                } else {
                    Err(format!("unexpected token {}", token))
                }
            }),
    );

    check(
        "whoami",
        api.who_am_i()
            .await
            .map(|u| format!("id={} role={}", u.id, u.role))
            .map_err(|e| e.to_string()),
    );

    check(
        "demo board detail",
        api.board_detail(1)
            .await
            .map(|d| format!("{} columns, {} tasks", d.columns.len(), d.tasks.len()))
            .map_err(|e| e.to_string()),
    );

    // Create → move → delete a scratch task in the demo board.
    let roundtrip = async {
        let detail = api.board_detail(1).await.map_err(|e| e.to_string())?;
        let cols = detail.columns_sorted();
        let (first, last) = match (cols.first(), cols.last()) {
            (Some(f), Some(l)) => (f.id, l.id),
            _ => return Err("demo board has no columns".to_string()),
        };
        let task = api
            .create_task(first, "selftest scratch task", None, None)
            .await
            .map_err(|e| e.to_string())?;
        api.update_task(task.id, TaskPatch::move_to(last))
            .await
            .map_err(|e| e.to_string())?;
        api.delete_task(task.id).await.map_err(|e| e.to_string())?;
        Ok(format!("task {} moved {} → {}", task.id, first, last))
    };
    check("task create/move/delete", roundtrip.await);

    if failures > 0 {
        anyhow::bail!("{} selftest check(s) failed", failures);
    }
    println!("{}", style("All checks passed.").green().bold());
    Ok(())
}
