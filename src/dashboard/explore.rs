// Line-oriented exploration of the dashboard: one session, driven by
// commands read from the input.

use std::io::{BufRead, Write};

use crate::dashboard::pages::{render_page, Page, RenderContext};
use crate::dashboard::session::{parse_focus, Dimension, Session};
use crate::dashboard::*;

const HELP: &str = "Commands:
  pages                      list the pages
  page <name|number>         open a page (filters and focus are reset)
  role|function|location <v> add or remove a filter value
  focus <1-5|none>           single out a rating in the charts
  clear                      remove all the filters and the focus
  options                    list the available filter values
  show                       render the current page
  help                       this message
  quit                       leave";

#[derive(Eq, PartialEq, Debug)]
enum Command {
    Pages,
    Page(String),
    Toggle(Dimension, String),
    Focus(String),
    Clear,
    Options,
    Show,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let (word, arg) = match line.split_once(char::is_whitespace) {
        Some((w, a)) => (w, a.trim()),
        None => (line, ""),
    };
    let word = word.to_lowercase();
    if let Some(dim) = Dimension::parse(&word) {
        if arg.is_empty() {
            return None;
        }
        return Some(Command::Toggle(dim, arg.to_string()));
    }
    match (word.as_str(), arg.is_empty()) {
        ("pages", true) => Some(Command::Pages),
        ("page", false) => Some(Command::Page(arg.to_string())),
        ("focus", _) => Some(Command::Focus(arg.to_string())),
        ("clear", true) => Some(Command::Clear),
        ("options", true) => Some(Command::Options),
        ("show", true) => Some(Command::Show),
        ("help", true) => Some(Command::Help),
        ("quit", true) | ("exit", true) => Some(Command::Quit),
        _ => None,
    }
}

fn write_line<W: Write>(output: &mut W, line: &str) -> DResult<()> {
    writeln!(output, "{}", line).context(WritingOutputSnafu { path: "stdout" })
}

fn write_json<W: Write>(output: &mut W, js: &JSValue) -> DResult<()> {
    let s = serde_json::to_string_pretty(js).context(ParsingJsonSnafu {})?;
    write_line(output, &s)
}

/// Reads commands until `quit` or the end of the input.
///
/// Invalid commands are reported on the output and do not stop the
/// exploration. Only input and output failures are returned.
pub fn run_explorer<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    ctx: &RenderContext,
) -> DResult<()> {
    let mut session = Session::new();
    write_line(
        output,
        &format!(
            "{} respondents loaded from {}. Type 'help' for the commands.",
            ctx.dataset.table.len(),
            ctx.dataset.origin
        ),
    )?;
    for (lineno, line) in input.lines().enumerate() {
        let line = line.context(ReadingInputSnafu {})?;
        if line.trim().is_empty() {
            continue;
        }
        debug!("run_explorer: command {}: {:?}", lineno + 1, line);
        let command = match parse_command(&line) {
            Some(c) => c,
            None => {
                write_line(output, &format!("Unknown command {:?}. Type 'help'.", line))?;
                continue;
            }
        };
        match command {
            Command::Quit => break,
            Command::Help => write_line(output, HELP)?,
            Command::Pages => {
                for (idx, p) in Page::ALL.iter().enumerate() {
                    write_line(output, &format!("{} {:<22} {}", idx, p.slug(), p.title()))?;
                }
            }
            Command::Page(name) => match Page::parse(&name) {
                Ok(p) => {
                    session.select_page(p);
                    write_line(output, p.title())?;
                }
                Err(e) => write_line(output, &e.to_string())?,
            },
            Command::Toggle(dim, value) => {
                let selected = session.toggle(dim, &value);
                let verb = if selected { "added" } else { "removed" };
                write_line(output, &format!("{:?} {} {}", dim, value, verb))?;
            }
            Command::Focus(arg) => match parse_focus(&arg) {
                Ok(f) => {
                    session.set_focus(f);
                    write_line(output, &format!("focus: {:?}", f))?;
                }
                Err(e) => write_line(output, &e.to_string())?,
            },
            Command::Clear => {
                session.clear();
                write_line(output, "filters cleared")?;
            }
            Command::Options => write_json(output, &filter_options_to_json(ctx.dataset))?,
            Command::Show => {
                let report = render_page(ctx, &session);
                let js = serde_json::to_value(report).context(ParsingJsonSnafu {})?;
                write_json(output, &js)?;
            }
        }
    }
    info!("run_explorer: done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::inference::TextModels;
    use crate::dashboard::schema::testing::sample_table;
    use crate::dashboard::schema::Schema;
    use crate::dashboard::source::Dataset;
    use std::io::Cursor;

    fn explore(commands: &str) -> String {
        let table = sample_table();
        let schema = Schema::resolve(&table, &[]).unwrap();
        let dataset = Dataset {
            table,
            schema,
            origin: "sample".to_string(),
        };
        let models = TextModels::disabled();
        let stopwords: Vec<String> = vec![];
        let ctx = RenderContext {
            dataset: &dataset,
            stopwords: &stopwords,
            models: &models,
        };
        let mut out: Vec<u8> = Vec::new();
        run_explorer(Cursor::new(commands.to_string()), &mut out, &ctx).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn commands() {
        assert_eq!(parse_command("pages"), Some(Command::Pages));
        assert_eq!(
            parse_command("location  North America "),
            Some(Command::Toggle(
                Dimension::Location,
                "North America".to_string()
            ))
        );
        assert_eq!(parse_command("Page 3"), Some(Command::Page("3".to_string())));
        assert_eq!(parse_command("focus"), Some(Command::Focus("".to_string())));
        assert_eq!(parse_command("role"), None);
        assert_eq!(parse_command("dance"), None);
    }

    #[test]
    fn filtered_page() {
        let out = explore("location Europe\nrole Manager\nshow\nquit\nshow\n");
        assert!(out.contains("Location Europe added"));
        assert!(out.contains("\"respondents\": 2"));
        // Nothing runs after quit.
        assert_eq!(out.matches("\"status\"").count(), 1);
    }

    #[test]
    fn errors_do_not_stop_the_session() {
        let out = explore("page 42\nfocus 9\nnonsense\npage payroll\nshow\n");
        assert!(out.contains("Unknown page \"42\""));
        assert!(out.contains("Invalid focus"));
        assert!(out.contains("Unknown command"));
        assert!(out.contains("\"page\": \"payroll\""));
    }
}
