use std::collections::BTreeSet;
use std::io::{self, Write};

use roomcount_tool::persistence::{
    load_export_from_csv, load_export_from_json, save_export_to_json, save_pivots_to_dir,
};
use roomcount_tool::{BookingExport, PivotMatrix, PivotRunSummary, SourceColumns};

fn render_pivot_as_text_table(pivot: &PivotMatrix) -> String {
    let mut header: Vec<String> = vec!["Event".into(), "Hotel".into(), "Room".into()];
    header.extend(
        pivot
            .stay_dates()
            .iter()
            .map(|date| date.format("%Y-%m-%d").to_string()),
    );

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(pivot.rows().len());
    for row in pivot.rows() {
        let mut cells = vec![
            row.key.event_name.clone(),
            row.key.hotel_name.clone(),
            row.key.room_name.clone(),
        ];
        cells.extend(row.counts.iter().map(ToString::to_string));
        rows.push(cells);
    }

    // Compute column widths
    let mut widths: Vec<usize> = header.iter().map(String::len).collect();
    for row in &rows {
        for (ci, cell) in row.iter().enumerate() {
            if cell.len() > widths[ci] {
                widths[ci] = cell.len();
            }
        }
    }

    // Build horizontal separator
    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |cells: &[String]| {
        let mut out = String::from("|");
        for (ci, cell) in cells.iter().enumerate() {
            out.push(' ');
            out.push_str(cell);
            let pad = widths[ci].saturating_sub(cell.len());
            if pad > 0 {
                out.push_str(&" ".repeat(pad));
            }
            out.push(' ');
            out.push('|');
        }
        out
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&header));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                     Show this help\n  load <path>              Load a raw CSV booking export\n  load json <path>         Load a JSON snapshot of a parsed export\n  save json <path>         Save the parsed export as a JSON snapshot\n  report                   Show the normalization report for the loaded export\n  events                   List the event names available for selection\n  select <event name>      Add an event to the selection (rest of line)\n  deselect <event name>    Remove an event from the selection\n  selected                 Show the current selection\n  clear                    Clear the selection\n  pivot                    Print one nightly room count table per event date\n  save pivots <dir>        Write one pivot_<date>.csv per event date into <dir>\n  quit|exit                Exit"
    );
}

fn main() {
    let columns = SourceColumns::default();
    let mut export = BookingExport::new();
    let mut selected: BTreeSet<String> = BTreeSet::new();

    println!("Room Count Pivot Tool (CLI) - type 'help' for commands\n");

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
        let rest = input[cmd.len()..].trim();

        match cmd {
            "help" => {
                print_help();
            }
            "quit" | "exit" => break,
            "load" => {
                if rest.is_empty() {
                    println!("Usage: load <path> | load json <path>");
                    continue;
                }
                let result = match rest.strip_prefix("json ") {
                    Some(path) => load_export_from_json(path.trim()),
                    None => load_export_from_csv(rest, &columns),
                };
                match result {
                    Ok(loaded) => {
                        println!("Export loaded ({}).", loaded.report().to_cli_summary());
                        export = loaded;
                        selected.clear();
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "save" => {
                if let Some(path) = rest.strip_prefix("json ") {
                    match save_export_to_json(&export, path.trim()) {
                        Ok(_) => println!("Export saved to {}.", path.trim()),
                        Err(e) => println!("Error: {}", e),
                    }
                } else if let Some(dir) = rest.strip_prefix("pivots ") {
                    let selection: Vec<String> = selected.iter().cloned().collect();
                    if selection.is_empty() {
                        println!("No events selected; nothing to save.");
                        continue;
                    }
                    let partitions = match export.pivot_partitions(&selection) {
                        Ok(partitions) => partitions,
                        Err(e) => {
                            println!("Error: {}", e);
                            continue;
                        }
                    };
                    match save_pivots_to_dir(&partitions, dir.trim()) {
                        Ok(written) => {
                            for path in &written {
                                println!("Wrote {}", path.display());
                            }
                            if written.is_empty() {
                                println!("No partitions produced room nights; nothing written.");
                            }
                        }
                        Err(e) => println!("Error: {}", e),
                    }
                } else {
                    println!("Usage: save json <path> | save pivots <dir>");
                }
            }
            "report" => {
                println!("{}", export.report().to_cli_summary());
            }
            "events" => match export.event_names() {
                Ok(names) if names.is_empty() => println!("No events loaded."),
                Ok(names) => {
                    for name in names {
                        let marker = if selected.contains(&name) { "*" } else { " " };
                        println!("{} {}", marker, name);
                    }
                }
                Err(e) => println!("Error: {}", e),
            },
            "select" => {
                if rest.is_empty() {
                    println!("Usage: select <event name>");
                    continue;
                }
                match export.event_names() {
                    Ok(names) if names.iter().any(|name| name == rest) => {
                        selected.insert(rest.to_string());
                        println!("Selected '{}'.", rest);
                    }
                    Ok(_) => println!("Unknown event '{}'. See 'events'.", rest),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "deselect" => {
                if selected.remove(rest) {
                    println!("Deselected '{}'.", rest);
                } else {
                    println!("'{}' was not selected.", rest);
                }
            }
            "selected" => {
                if selected.is_empty() {
                    println!("No events selected.");
                } else {
                    for name in &selected {
                        println!("{}", name);
                    }
                }
            }
            "clear" => {
                selected.clear();
                println!("Selection cleared.");
            }
            "pivot" => {
                let selection: Vec<String> = selected.iter().cloned().collect();
                if selection.is_empty() {
                    println!("No events selected; nothing to pivot.");
                    continue;
                }
                match export.pivot_partitions(&selection) {
                    Ok(partitions) => {
                        if partitions.is_empty() {
                            println!("No matching bookings for the current selection.");
                            continue;
                        }
                        for partition in &partitions {
                            match &partition.pivot {
                                Some(pivot) => {
                                    println!("Pivot for {}", partition.event_date);
                                    println!("{}", render_pivot_as_text_table(pivot));
                                }
                                None => println!(
                                    "Pivot for {}: no room nights in this partition",
                                    partition.event_date
                                ),
                            }
                        }
                        let summary = PivotRunSummary::from_partitions(&partitions);
                        println!("Done ({})", summary.to_cli_summary());
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
