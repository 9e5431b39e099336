//! Command-line interface for structural-edit
//! Inspects Clojure files and runs structural edits on them, mostly for trying things out
//! and for reproducing editor behavior outside an editor.
//!
//! Usage:
//!   sedit tokens `<path>` [--json]                              - Print the token stream per line
//!   sedit indent `<path>` --offset `<n>` [--config `<file>`]      - Print the indent column at an offset
//!   sedit edit `<operation>` `<path>` --offset `<n>` [--end `<m>`]  - Run a paredit operation
//!   sedit balance `<path>`                                      - Print the missing brackets

use clap::{value_parser, Arg, ArgAction, Command};
use structural_edit::config::{self, FormatterConfig};
use structural_edit::cursor_doc::balance::get_missing_brackets;
use structural_edit::cursor_doc::document::{EditableDocument, StringDocument};
use structural_edit::cursor_doc::indent::get_indent;
use structural_edit::cursor_doc::model::LineInputModel;
use structural_edit::cursor_doc::paredit::{self, Motion};
use structural_edit::cursor_doc::selection::Selection;
use structural_edit::cursor_doc::testing::text_notation;

const OPERATIONS: &[&str] = &[
    "forward-sexp",
    "backward-sexp",
    "forward-sexp-or-up",
    "backward-sexp-or-up",
    "forward-up-list",
    "backward-up-list",
    "forward-down-list",
    "backward-down-list",
    "forward-list",
    "backward-list",
    "select-forward-sexp",
    "select-backward-sexp",
    "select-current-form",
    "select-top-level-form",
    "grow-selection",
    "shrink-selection",
    "wrap-round",
    "wrap-square",
    "wrap-curly",
    "wrap-quote",
    "rewrap-round",
    "rewrap-square",
    "rewrap-curly",
    "split-sexp",
    "join-sexp",
    "splice-sexp",
    "splice-sexp-killing-forward",
    "splice-sexp-killing-backward",
    "raise-sexp",
    "convolute-sexp",
    "transpose-sexps",
    "drag-sexp-backward",
    "drag-sexp-forward",
    "kill-forward-list",
    "kill-backward-list",
    "forward-slurp-sexp",
    "backward-slurp-sexp",
    "forward-barf-sexp",
    "backward-barf-sexp",
    "backspace",
    "delete-forward",
    "string-quote",
];

fn main() {
    let matches = Command::new("sedit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Structural editing for Clojure source")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("tokens")
                .about("Print the token stream of each line")
                .arg(
                    Arg::new("path")
                        .help("Path to the Clojure file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the lines as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("indent")
                .about("Print the indentation column for an offset")
                .arg(
                    Arg::new("path")
                        .help("Path to the Clojure file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("offset")
                        .long("offset")
                        .short('o')
                        .help("Byte offset to indent for")
                        .required(true)
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .help("Formatter configuration (.json, .yaml or .edn)"),
                ),
        )
        .subcommand(
            Command::new("edit")
                .about("Run a structural edit and print the result in text notation")
                .arg(
                    Arg::new("operation")
                        .help("Operation to run")
                        .required(true)
                        .index(1)
                        .value_parser(OPERATIONS.to_vec()),
                )
                .arg(
                    Arg::new("path")
                        .help("Path to the Clojure file")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::new("offset")
                        .long("offset")
                        .short('o')
                        .help("Byte offset of the caret, or of the selection anchor")
                        .required(true)
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("end")
                        .long("end")
                        .short('e')
                        .help("Active end of the selection")
                        .value_parser(value_parser!(usize)),
                ),
        )
        .subcommand(
            Command::new("balance")
                .about("Print the brackets missing from a file")
                .arg(
                    Arg::new("path")
                        .help("Path to the Clojure file")
                        .required(true)
                        .index(1),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("tokens", tokens_matches)) => {
            let path = tokens_matches.get_one::<String>("path").unwrap();
            handle_tokens_command(path, tokens_matches.get_flag("json"));
        }
        Some(("indent", indent_matches)) => {
            let path = indent_matches.get_one::<String>("path").unwrap();
            let offset = *indent_matches.get_one::<usize>("offset").unwrap();
            let config = indent_matches.get_one::<String>("config");
            handle_indent_command(path, offset, config.map(String::as_str));
        }
        Some(("edit", edit_matches)) => {
            let operation = edit_matches.get_one::<String>("operation").unwrap();
            let path = edit_matches.get_one::<String>("path").unwrap();
            let offset = *edit_matches.get_one::<usize>("offset").unwrap();
            let end = edit_matches.get_one::<usize>("end").copied();
            handle_edit_command(operation, path, offset, end);
        }
        Some(("balance", balance_matches)) => {
            let path = balance_matches.get_one::<String>("path").unwrap();
            handle_balance_command(path);
        }
        _ => unreachable!(),
    }
}

fn read_source(path: &str) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file: {}", e);
        std::process::exit(1);
    })
}

/// Handle the tokens command
fn handle_tokens_command(path: &str, json: bool) {
    let model = LineInputModel::new(&read_source(path));
    if json {
        let lines: Vec<_> = model.lines().iter().map(|line| &line.tokens).collect();
        match serde_json::to_string_pretty(&lines) {
            Ok(output) => println!("{}", output),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }
    for (row, line) in model.lines().iter().enumerate() {
        let tokens: Vec<String> = line.tokens.iter().map(|t| t.to_string()).collect();
        println!("{:>4}: {}", row + 1, tokens.join(" "));
    }
}

/// Handle the indent command
fn handle_indent_command(path: &str, offset: usize, config_path: Option<&str>) {
    let model = LineInputModel::new(&read_source(path));
    let config = match config_path {
        Some(config_path) => config::load(config_path).unwrap_or_else(|e| {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }),
        None => FormatterConfig::default(),
    };
    if offset > model.max_offset() {
        eprintln!(
            "Error: offset {} is past the end of the document ({})",
            offset,
            model.max_offset()
        );
        std::process::exit(1);
    }
    println!("{}", get_indent(&model, offset, &config));
}

/// Handle the edit command
fn handle_edit_command(operation: &str, path: &str, offset: usize, end: Option<usize>) {
    let source = read_source(path);
    let selection = Selection::new(offset, end.unwrap_or(offset));
    let mut doc = StringDocument::with_selections(&source, vec![selection]);
    if selection.end() > doc.model().max_offset() {
        eprintln!("Error: selection is past the end of the document");
        std::process::exit(1);
    }
    if let Err(e) = run_operation(&mut doc, operation) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    print!("{}", text_notation(&doc));
}

fn run_operation(doc: &mut StringDocument, operation: &str) -> Result<(), String> {
    let motion = |name: &str| match name {
        "forward-sexp" => Some(Motion::ForwardSexp),
        "backward-sexp" => Some(Motion::BackwardSexp),
        "forward-sexp-or-up" => Some(Motion::ForwardSexpOrUp),
        "backward-sexp-or-up" => Some(Motion::BackwardSexpOrUp),
        "forward-up-list" => Some(Motion::ForwardUpList),
        "backward-up-list" => Some(Motion::BackwardUpList),
        "forward-down-list" => Some(Motion::ForwardDownList),
        "backward-down-list" => Some(Motion::BackwardDownList),
        "forward-list" => Some(Motion::ForwardList),
        "backward-list" => Some(Motion::BackwardList),
        _ => None,
    };
    if let Some(m) = motion(operation) {
        paredit::move_by(doc, m, false);
        return Ok(());
    }
    match operation {
        "select-forward-sexp" => paredit::select_by(doc, Motion::ForwardSexp, false),
        "select-backward-sexp" => paredit::select_by(doc, Motion::BackwardSexp, false),
        "select-current-form" => paredit::select_current_form(doc, false, false),
        "select-top-level-form" => paredit::select_current_form(doc, true, false),
        "grow-selection" => {
            paredit::grow_selection(doc, false);
        }
        "shrink-selection" => {
            paredit::shrink_selection(doc, false);
        }
        "wrap-round" => {
            paredit::wrap_sexp(doc, "(", ")");
        }
        "wrap-square" => {
            paredit::wrap_sexp(doc, "[", "]");
        }
        "wrap-curly" => {
            paredit::wrap_sexp(doc, "{", "}");
        }
        "wrap-quote" => {
            paredit::wrap_sexp(doc, "\"", "\"");
        }
        "rewrap-round" => {
            paredit::rewrap_sexp(doc, "(", ")");
        }
        "rewrap-square" => {
            paredit::rewrap_sexp(doc, "[", "]");
        }
        "rewrap-curly" => {
            paredit::rewrap_sexp(doc, "{", "}");
        }
        "split-sexp" => {
            paredit::split_sexp(doc);
        }
        "join-sexp" => {
            paredit::join_sexp(doc);
        }
        "splice-sexp" => {
            paredit::splice_sexp(doc);
        }
        "splice-sexp-killing-forward" => {
            paredit::splice_sexp_killing_forward(doc);
        }
        "splice-sexp-killing-backward" => {
            paredit::splice_sexp_killing_backward(doc);
        }
        "raise-sexp" => {
            paredit::raise_sexp(doc);
        }
        "convolute-sexp" => {
            paredit::convolute_sexp(doc);
        }
        "transpose-sexps" => {
            paredit::transpose_sexps(doc);
        }
        "drag-sexp-backward" => {
            paredit::drag_sexp_backward(doc);
        }
        "drag-sexp-forward" => {
            paredit::drag_sexp_forward(doc);
        }
        "kill-forward-list" => {
            paredit::kill_forward_list(doc).map_err(|e| e.to_string())?;
        }
        "kill-backward-list" => {
            paredit::kill_backward_list(doc).map_err(|e| e.to_string())?;
        }
        "forward-slurp-sexp" => {
            paredit::forward_slurp_sexp(doc);
        }
        "backward-slurp-sexp" => {
            paredit::backward_slurp_sexp(doc);
        }
        "forward-barf-sexp" => {
            paredit::forward_barf_sexp(doc);
        }
        "backward-barf-sexp" => {
            paredit::backward_barf_sexp(doc);
        }
        "backspace" => {
            paredit::backspace(doc);
        }
        "delete-forward" => {
            paredit::delete_forward(doc);
        }
        "string-quote" => {
            paredit::string_quote(doc);
        }
        other => return Err(format!("unknown operation '{}'", other)),
    }
    Ok(())
}

/// Handle the balance command
fn handle_balance_command(path: &str) {
    let missing = get_missing_brackets(&read_source(path));
    println!("prepend: {:?}", missing.prepend);
    println!("append: {:?}", missing.append);
}
