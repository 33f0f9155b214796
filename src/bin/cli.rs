use pert_estimator::config::LOG_ENV;
use pert_estimator::{
    CandidateFilter, EstimateField, EstimateInput, EstimationSession, EstimatorConfig,
    ProjectSummary, Task,
};
use std::fs::File;
use std::io::{self, Write};
use std::str::FromStr;

const TASK_HEADERS: [&str; 7] = ["id", "name", "O", "M", "P", "expected", "std_dev"];
const CANDIDATE_HEADERS: [&str; 6] = ["#", "id", "type", "title", "assigned_to", "state"];

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            if len > widths[ci] {
                widths[ci] = len;
            }
        }
    }

    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&widths, headers));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&render_row(&widths, &cells));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn render_row(widths: &[usize], cells: &[&str]) -> String {
    let mut line = String::from("|");
    for (ci, cell) in cells.iter().enumerate() {
        line.push(' ');
        line.push_str(cell);
        let pad = widths[ci].saturating_sub(cell.chars().count());
        line.push_str(&" ".repeat(pad));
        line.push_str(" |");
    }
    line
}

fn task_row(task: &Task) -> Vec<String> {
    let estimate = task.estimate();
    vec![
        task.display_id(),
        task.name.clone(),
        task.optimistic.clone(),
        task.most_likely.clone(),
        task.pessimistic.clone(),
        estimate.expected_display(),
        estimate.std_dev_display(),
    ]
}

fn render_tasks(session: &EstimationSession) -> String {
    match session.tasks() {
        Ok(tasks) => {
            let rows: Vec<Vec<String>> = tasks.iter().map(task_row).collect();
            render_text_table(&TASK_HEADERS, &rows)
        }
        Err(e) => format!("Error reading tasks: {e}"),
    }
}

fn render_candidates(session: &EstimationSession, filter: &CandidateFilter) -> String {
    let candidates = session.candidates();
    let rows: Vec<Vec<String>> = session
        .filter_candidates(filter)
        .into_iter()
        .map(|idx| {
            let c = &candidates[idx];
            vec![
                idx.to_string(),
                c.external_id.clone(),
                c.work_item_type.clone(),
                c.title.clone(),
                c.assigned_to.clone(),
                c.state.clone(),
            ]
        })
        .collect();
    let (types, states) = session.candidate_facets();
    format!(
        "{}Types: {}\nStates: {}",
        render_text_table(&CANDIDATE_HEADERS, &rows),
        types.join(", "),
        states.join(", ")
    )
}

fn print_summary(summary: &ProjectSummary) {
    println!("Tasks              : {}", summary.total_tasks);
    println!("Estimated tasks    : {}", summary.estimated_tasks);
    println!("Expected duration  : {:.2} h", summary.total_expected);
    println!("Total variance     : {:.4}", summary.total_variance);
    println!("Standard deviation : {:.2} h", summary.total_std_dev);
    for ci in &summary.intervals {
        println!(
            "{:<19}: {:.2} h - {:.2} h (±{}σ)",
            ci.label, ci.low, ci.high, ci.z
        );
    }
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show tasks with live estimates\n  new                                Append an empty task\n  add <O> <M> <P> <name...>          Append a task with an estimate\n  name <id> <text...>                Rename a task\n  set <id> <o|m|p> [value]           Edit one estimate field (omit value to clear)\n  est <id> <O> <M> <P>               Replace the whole estimate\n  delete <id>                        Delete a task\n  import <path>                      Load work item candidates from a CSV export\n  candidates [search...]             List loaded candidates, optionally filtered\n  select <i,j,...>                   Add the listed candidates as tasks\n  summary                            Show project totals and confidence intervals\n  export [path]                      Write tasks and estimates as CSV\n  restore <path>                     Append tasks from an earlier export\n  quit|exit                          Exit"
    );
}

fn parse_index_list(s: &str) -> Result<Vec<usize>, String> {
    s.split(',')
        .filter(|p| !p.trim().is_empty())
        .map(|p| {
            p.trim()
                .parse::<usize>()
                .map_err(|_| format!("Invalid candidate index '{}'", p.trim()))
        })
        .collect()
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let config = match EstimatorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Ignoring config: {e}");
            EstimatorConfig::default()
        }
    };
    let mut session = EstimationSession::with_config(config);

    println!("PERT Estimator (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => println!("{}", render_tasks(&session)),
            "new" => match session.add_empty_task() {
                Ok(id) => {
                    println!("Added empty task id={id}");
                    println!("{}", render_tasks(&session));
                }
                Err(e) => println!("Error: {e}"),
            },
            "add" => {
                let o = parts.next();
                let m = parts.next();
                let p = parts.next();
                let name: Vec<&str> = parts.collect();
                match (o, m, p) {
                    (Some(o), Some(m), Some(p)) => {
                        let name = name.join(" ");
                        match session.add_task(&name, EstimateInput::new(o, m, p)) {
                            Ok(id) => {
                                println!("Added task id={id}");
                                println!("{}", render_tasks(&session));
                            }
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: add <O> <M> <P> <name...>"),
                }
            }
            "name" => {
                let id_s = parts.next();
                let rest: Vec<&str> = parts.collect();
                match id_s {
                    Some(id_s) => {
                        let id: i32 = match id_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid id");
                                continue;
                            }
                        };
                        match session.rename_task(id, &rest.join(" ")) {
                            Ok(_) => println!("Task {id} renamed.\n{}", render_tasks(&session)),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    None => println!("Usage: name <id> <text...>"),
                }
            }
            "set" => {
                let id_s = parts.next();
                let field_s = parts.next();
                let value = parts.next().unwrap_or("");
                match (id_s, field_s) {
                    (Some(id_s), Some(field_s)) => {
                        let id: i32 = match id_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid id");
                                continue;
                            }
                        };
                        let field = match EstimateField::from_str(field_s) {
                            Ok(f) => f,
                            Err(e) => {
                                println!("{e}");
                                continue;
                            }
                        };
                        match session.update_estimate_field(id, field, value) {
                            Ok(_) => println!("{field} set.\n{}", render_tasks(&session)),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: set <id> <o|m|p> [value]"),
                }
            }
            "est" => {
                let id_s = parts.next();
                let values: Vec<&str> = parts.collect();
                match (id_s, values.as_slice()) {
                    (Some(id_s), [o, m, p]) => {
                        let id: i32 = match id_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid id");
                                continue;
                            }
                        };
                        match session.set_estimate(id, &EstimateInput::new(*o, *m, *p)) {
                            Ok(_) => println!("Estimate set.\n{}", render_tasks(&session)),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: est <id> <O> <M> <P>"),
                }
            }
            "delete" => match parts.next() {
                Some(id_s) => match id_s.parse::<i32>() {
                    Ok(id) => match session.delete_task(id) {
                        Ok(true) => {
                            println!("Deleted task {id}.");
                            println!("{}", render_tasks(&session));
                        }
                        Ok(false) => println!("Task {id} not found."),
                        Err(e) => println!("Error deleting task: {e}"),
                    },
                    Err(_) => println!("Invalid id"),
                },
                None => println!("Usage: delete <id>"),
            },
            "import" => match parts.next() {
                Some(path) => match session.import_candidates_from_path(path) {
                    Ok(report) => {
                        println!(
                            "Imported {} candidates ({} rows read, {} skipped).",
                            report.candidates.len(),
                            report.rows_read,
                            report.dropped
                        );
                        println!(
                            "{}",
                            render_candidates(&session, &CandidateFilter::default())
                        );
                    }
                    Err(e) => println!("Import failed: {e}"),
                },
                None => println!("Usage: import <path>"),
            },
            "candidates" => {
                let rest: Vec<&str> = parts.collect();
                let filter = if rest.is_empty() {
                    CandidateFilter::default()
                } else {
                    CandidateFilter::search(rest.join(" "))
                };
                println!("{}", render_candidates(&session, &filter));
            }
            "select" => match parts.next() {
                Some(list) => match parse_index_list(list) {
                    Ok(indices) if !indices.is_empty() => {
                        match session.apply_selected(&indices) {
                            Ok(ids) => {
                                println!("Added {} task(s) from candidates.", ids.len());
                                println!("{}", render_tasks(&session));
                            }
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    Ok(_) => println!("Usage: select <i,j,...>"),
                    Err(e) => println!("{e}"),
                },
                None => println!("Usage: select <i,j,...>"),
            },
            "summary" => match session.summary() {
                Ok(summary) => print_summary(&summary),
                Err(e) => println!("Summary error: {e}"),
            },
            "export" => {
                match session.can_export() {
                    Ok(true) => {}
                    Ok(false) => {
                        println!("Nothing to export: give at least one task a name.");
                        continue;
                    }
                    Err(e) => {
                        println!("Error: {e}");
                        continue;
                    }
                }
                let path = parts
                    .next()
                    .map(ToOwned::to_owned)
                    .unwrap_or_else(|| session.export_file_name(chrono::Local::now().date_naive()));
                match session.export_to_path(&path) {
                    Ok(_) => println!("Exported to {path}."),
                    Err(e) => println!("Error exporting: {e}"),
                }
            }
            "restore" => match parts.next() {
                Some(path) => match File::open(path) {
                    Ok(file) => match session.restore_from_export(file) {
                        Ok(ids) => {
                            println!("Restored {} task(s) from {path}.", ids.len());
                            println!("{}", render_tasks(&session));
                        }
                        Err(e) => println!("Error restoring: {e}"),
                    },
                    Err(e) => println!("Error reading {path}: {e}"),
                },
                None => println!("Usage: restore <path>"),
            },
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
