use html::{DOMElement, Pointer};
use navi::clock::{current_time, navi_name};
use navi::{DropdownMenu, Location, PageQuery, QueryMessage, StdoutChannel};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, span, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use url::Url;

const USAGE: &str = "\
navi [--trace|-t] <command>

commands:
    query <url> [name ...]                    print the query block and parameters
    send <name> [key=value ...]               print a data status line
    menu <file> [--id <id>] [--hover <path>]  instrument a list menu and print it
    time [--user-agent <ua>]                  print the time of day";

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Args(#[from] pico_args::Error),
    #[error("{0}")]
    Usage(String),
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse HTML in {0}")]
    Html(PathBuf),
}

#[derive(Debug, PartialEq)]
enum Command {
    Query { url: String, names: Vec<String> },
    Send { name: String, pairs: Vec<String> },
    Menu {
        file: PathBuf,
        id: Option<String>,
        hover: Option<String>,
    },
    Time { user_agent: Option<String> },
}

#[derive(Debug)]
struct Args {
    pub command: Command,
    pub trace: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let args = parse_args(pico_args::Arguments::from_env())?;
    if args.trace {
        tracing_subscriber::fmt::fmt()
            .with_span_events(FmtSpan::ACTIVE)
            .with_max_level(Level::DEBUG)
            .with_env_filter(EnvFilter::from_default_env())
            .finish()
            .init();
        info!("Logger initialized");
    }

    match args.command {
        Command::Query { url, names } => match Url::parse(&url) {
            Ok(url) => print_query(PageQuery::new(url), &names),
            Err(_) => print_query(PageQuery::new(url), &names),
        },
        Command::Send { name, pairs } => send(name, &pairs)?,
        Command::Menu { file, id, hover } => menu(file, id, hover)?,
        Command::Time { user_agent } => {
            println!("{}", current_time());
            if let Some(ua) = user_agent {
                println!("{}", navi_name(&ua).trim_start());
            }
        }
    }
    Ok(())
}

fn parse_args(mut pargs: pico_args::Arguments) -> Result<Args, CliError> {
    let trace = pargs.contains(["-t", "--trace"]);
    let command = match pargs.subcommand()?.as_deref() {
        Some("query") => Command::Query {
            url: pargs.free_from_str()?,
            names: rest(&mut pargs)?,
        },
        Some("send") => Command::Send {
            name: pargs.free_from_str()?,
            pairs: rest(&mut pargs)?,
        },
        Some("menu") => {
            let id = pargs.opt_value_from_str("--id")?;
            let hover = pargs.opt_value_from_str("--hover")?;
            Command::Menu {
                file: pargs.free_from_str()?,
                id,
                hover,
            }
        }
        Some("time") => Command::Time {
            user_agent: pargs.opt_value_from_str("--user-agent")?,
        },
        Some(other) => {
            return Err(CliError::Usage(format!(
                "unknown command {}\n\n{}",
                other, USAGE
            )))
        }
        None => return Err(CliError::Usage(USAGE.to_string())),
    };
    Ok(Args { command, trace })
}

/// Remaining free arguments, in order
fn rest(pargs: &mut pico_args::Arguments) -> Result<Vec<String>, CliError> {
    let mut values = Vec::new();
    while let Some(value) = pargs.opt_free_from_str()? {
        values.push(value);
    }
    Ok(values)
}

fn print_query<L: Location>(query: PageQuery<L>, names: &[String]) {
    println!("page: {}", query.page_name());
    println!("block: {}", query.block_name());
    if names.is_empty() {
        for param in query.params() {
            println!("{}={}", param.name, param.value);
        }
    } else {
        for name in names {
            println!("{}={}", name, query.get(name));
        }
    }
}

fn send(name: String, pairs: &[String]) -> Result<(), CliError> {
    let mut msg = QueryMessage::new(name);
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| CliError::Usage(format!("expected key=value, got {}", pair)))?;
        msg.push(key, value);
    }
    msg.send(&mut StdoutChannel);
    Ok(())
}

fn parse_path(path: &str) -> Result<Vec<usize>, CliError> {
    path.split('.')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map_err(|_| CliError::Usage(format!("bad element path {}", path)))
        })
        .collect()
}

fn menu(file: PathBuf, id: Option<String>, hover: Option<String>) -> Result<(), CliError> {
    let text = std::fs::read_to_string(&file).map_err(|source| CliError::Io {
        path: file.clone(),
        source,
    })?;
    let (_, mut doc) = html::document(&text).map_err(|_| CliError::Html(file.clone()))?;
    let list = match &id {
        Some(id) => doc.get_element_by_id_mut(id),
        None => doc.find_mut("ul"),
    }
    .ok_or_else(|| CliError::Usage(format!("no menu list found in {}", file.display())))?;

    let span = span!(Level::DEBUG, "Menu", file = %file.display());
    let _enter = span.enter();
    let submenus = DropdownMenu::attach(list);
    info!(submenus, "Menu ready");

    if let Some(hover) = hover {
        let path = parse_path(&hover)?;
        if !Pointer::new().move_to(list, Some(path.as_slice())) {
            return Err(CliError::Usage(format!("no element at {}", hover)));
        }
    }
    print_outline(list, 0);
    Ok(())
}

/// One line per list item; `[+]` marks an open submenu and `[-]` a closed one
fn print_outline(list: &DOMElement, depth: usize) {
    for item in list.children().filter(|el| el.is("li")) {
        let submenu = item.children().find(|el| el.is("ul"));
        let label = item
            .children()
            .filter(|el| !el.is("ul"))
            .map(DOMElement::text_content)
            .chain(std::iter::once(item.own_text()))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let marker = match submenu {
            Some(sub) if sub.is_hidden() => "[-] ",
            Some(_) => "[+] ",
            None => "",
        };
        println!("{}{}{}", "  ".repeat(depth), marker, label);
        if let Some(sub) = submenu.filter(|sub| !sub.is_hidden()) {
            print_outline(sub, depth + 1);
        }
    }
}

#[cfg(test)]
fn args(list: &[&str]) -> pico_args::Arguments {
    pico_args::Arguments::from_vec(list.iter().map(std::ffi::OsString::from).collect())
}

#[cfg(test)]
#[test]
fn test_parse_send() {
    for flag in ["-t", "--trace"] {
        let parsed = parse_args(args(&[flag, "send", "foo", "x=5", "y=a b"])).unwrap();
        assert!(parsed.trace);
        assert_eq!(
            parsed.command,
            Command::Send {
                name: "foo".to_string(),
                pairs: vec!["x=5".to_string(), "y=a b".to_string()],
            }
        );
    }
    let parsed = parse_args(args(&["send", "foo"])).unwrap();
    assert!(!parsed.trace);
}

#[cfg(test)]
#[test]
fn test_parse_menu_options() {
    let parsed = parse_args(args(&["menu", "--id", "dropdownMenu", "--hover", "0.1", "m.html"])).unwrap();
    assert_eq!(
        parsed.command,
        Command::Menu {
            file: PathBuf::from("m.html"),
            id: Some("dropdownMenu".to_string()),
            hover: Some("0.1".to_string()),
        }
    );
    assert_eq!(parse_path("0.1").unwrap(), vec![0, 1]);
}

#[cfg(test)]
#[test]
fn test_parse_bad_command() {
    assert!(matches!(parse_args(args(&["fly"])), Err(CliError::Usage(_))));
    assert!(matches!(parse_args(args(&[])), Err(CliError::Usage(_))));
}
