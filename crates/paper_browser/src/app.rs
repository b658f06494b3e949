use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use paper_core::{update, DownloadStatus, Msg, PageState, PageStatus};
use paper_engine::{DirectoryPersister, EngineHandle, GatewaySettings};
use paper_logging::{paper_debug, paper_info};

use crate::cli::{Cli, Command};
use crate::effects::EffectRunner;
use crate::render::render;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

const HELP: &str = "\
Commands:
  cat <code>      open a category listing (e.g. cat cs.AI)
  search <text>   free-text search
  page <n>        jump to page n of the listing
  next | prev     move one page forward or back
  refresh         reload the current page
  get <n>         download the PDF of paper n on this page
  all             download every paper on this page as papers.zip
  home            leave the current listing
  help            show this help
  quit            exit";

pub fn run(cli: Cli) -> Result<ExitCode> {
    let settings = GatewaySettings {
        request_timeout: Duration::from_secs(cli.timeout_secs),
        download_timeout: Duration::from_secs(cli.download_timeout_secs),
        ..GatewaySettings::new(cli.base_url.clone())
    };
    paper_info!(
        "Using {} (downloads into {:?})",
        settings.base_url,
        cli.output_dir
    );
    let engine = EngineHandle::new(settings, DirectoryPersister::new(&cli.output_dir))
        .context("could not set up the HTTP client")?;
    let mut app = App::new(EffectRunner::new(engine));

    match cli.command {
        Command::List { category, page } => {
            app.open_listing(category, page)?;
            app.print_view();
            Ok(app.fetch_exit_code())
        }
        Command::Search { query } => {
            let query = query.join(" ");
            if query.trim().is_empty() {
                bail!("search query must not be empty");
            }
            app.dispatch(Msg::SearchSubmitted(query));
            app.settle()?;
            app.print_view();
            Ok(app.fetch_exit_code())
        }
        Command::Download { pdf_url, title } => {
            app.dispatch(Msg::DownloadRequested { pdf_url, title });
            app.settle()?;
            app.print_view();
            Ok(app.download_exit_code())
        }
        Command::DownloadAll { category, page } => {
            app.open_listing(category, page)?;
            if app.state.status() != PageStatus::Loaded {
                app.print_view();
                return Ok(ExitCode::FAILURE);
            }
            app.dispatch(Msg::DownloadAllClicked);
            app.settle()?;
            app.print_view();
            Ok(app.download_exit_code())
        }
        Command::Browse { category } => {
            if let Some(category) = category {
                app.dispatch(Msg::CategorySelected(category));
            }
            app.browse()?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

struct App {
    state: PageState,
    runner: EffectRunner,
}

impl App {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: PageState::new(),
            runner,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);
    }

    /// Blocks until no fetch and no download is outstanding.
    fn settle(&mut self) -> Result<()> {
        self.settle_while(|state| {
            state.status() == PageStatus::Loading || state.download_in_flight()
        })
    }

    fn settle_while(&mut self, pending: impl Fn(&PageState) -> bool) -> Result<()> {
        while pending(&self.state) {
            match self.runner.next_timeout(POLL_INTERVAL) {
                Ok(msg) => self.dispatch(msg),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => bail!("the network engine stopped"),
            }
        }
        Ok(())
    }

    /// Loads `page` (1-based) of `category`, going through the first page to
    /// learn the total.
    fn open_listing(&mut self, category: String, page: u32) -> Result<()> {
        self.dispatch(Msg::CategorySelected(category));
        self.settle()?;
        if page <= 1 || self.state.status() != PageStatus::Loaded {
            return Ok(());
        }
        let skip = self.page_skip(page)?;
        self.dispatch(Msg::PageSelected(skip));
        self.settle()
    }

    fn page_skip(&self, page: u32) -> Result<u32> {
        let pages = self.state.view().pages;
        pages
            .get(page.saturating_sub(1) as usize)
            .map(|link| link.skip)
            .ok_or_else(|| anyhow!("page {page} is out of range ({} pages)", pages.len()))
    }

    fn print_view(&mut self) {
        self.state.consume_dirty();
        print!("{}", render(&self.state.view()));
    }

    fn fetch_exit_code(&self) -> ExitCode {
        match self.state.status() {
            PageStatus::Error => ExitCode::FAILURE,
            _ => ExitCode::SUCCESS,
        }
    }

    fn download_exit_code(&self) -> ExitCode {
        match self.state.download() {
            Some(job) if job.status == DownloadStatus::Done => ExitCode::SUCCESS,
            _ => ExitCode::FAILURE,
        }
    }

    fn browse(&mut self) -> Result<()> {
        let lines = spawn_stdin_reader();
        println!("{HELP}");
        self.print_view();
        prompt();

        loop {
            let mut changed = false;
            while let Some(msg) = self.runner.try_next() {
                self.dispatch(msg);
                changed = true;
            }
            if changed && self.state.consume_dirty() {
                println!();
                print!("{}", render(&self.state.view()));
                prompt();
            }

            match lines.recv_timeout(POLL_INTERVAL) {
                Ok(line) => match parse_command(&line) {
                    Ok(None) => prompt(),
                    Ok(Some(ReplCommand::Quit)) => break,
                    Ok(Some(ReplCommand::Help)) => {
                        println!("{HELP}");
                        prompt();
                    }
                    Ok(Some(command)) => {
                        paper_debug!("Command {:?}", command);
                        match self.command_to_msg(command) {
                            Ok(msg) => self.dispatch(msg),
                            Err(err) => println!("{err}"),
                        }
                        if self.state.consume_dirty() {
                            print!("{}", render(&self.state.view()));
                        }
                        prompt();
                    }
                    Err(err) => {
                        println!("{err}");
                        prompt();
                    }
                },
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        // Input closed: let a running download finish writing its file.
        self.settle_while(PageState::download_in_flight)?;
        if self.state.consume_dirty() {
            print!("{}", render(&self.state.view()));
        }
        Ok(())
    }

    fn command_to_msg(&self, command: ReplCommand) -> Result<Msg> {
        let msg = match command {
            ReplCommand::Category(category) => Msg::CategorySelected(category),
            ReplCommand::Search(query) => Msg::SearchSubmitted(query),
            ReplCommand::Page(page) => Msg::PageSelected(self.page_skip(page)?),
            ReplCommand::Next => Msg::NextPage,
            ReplCommand::Prev => Msg::PreviousPage,
            ReplCommand::Refresh => Msg::Refresh,
            ReplCommand::Get(number) => {
                if self.state.download_in_flight() {
                    bail!("a download is already in progress");
                }
                let index = number.saturating_sub(1);
                if index >= self.state.items().len() {
                    bail!("no paper {number} on this page");
                }
                Msg::DownloadClicked { index }
            }
            ReplCommand::All => {
                if self.state.download_in_flight() {
                    bail!("a download is already in progress");
                }
                Msg::DownloadAllClicked
            }
            ReplCommand::Home => Msg::NavigatedAway,
            ReplCommand::Help | ReplCommand::Quit => Msg::NoOp,
        };
        Ok(msg)
    }
}

fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand {
    Category(String),
    Search(String),
    /// 1-based.
    Page(u32),
    Next,
    Prev,
    Refresh,
    /// 1-based.
    Get(usize),
    All,
    Home,
    Help,
    Quit,
}

/// `Ok(None)` for a blank line.
fn parse_command(line: &str) -> Result<Option<ReplCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "cat" | "category" => ReplCommand::Category(required(rest, "cat <code>")?),
        "search" | "s" => ReplCommand::Search(required(rest, "search <text>")?),
        "page" | "p" => ReplCommand::Page(number(rest, "page <n>")?),
        "next" | "n" => ReplCommand::Next,
        "prev" => ReplCommand::Prev,
        "refresh" | "r" => ReplCommand::Refresh,
        "get" | "g" => ReplCommand::Get(number(rest, "get <n>")?),
        "all" => ReplCommand::All,
        "home" => ReplCommand::Home,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => bail!("unknown command `{other}`; type `help`"),
    };
    Ok(Some(command))
}

fn required(rest: &str, usage: &str) -> Result<String> {
    if rest.is_empty() {
        bail!("usage: {usage}");
    }
    Ok(rest.to_string())
}

fn number<T: std::str::FromStr + PartialOrd + From<u8>>(rest: &str, usage: &str) -> Result<T> {
    match rest.parse::<T>() {
        Ok(value) if value >= T::from(1) => Ok(value),
        _ => bail!("usage: {usage} (n starts at 1)"),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_command, ReplCommand};

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(
            parse_command("cat cs.AI").unwrap(),
            Some(ReplCommand::Category("cs.AI".to_string()))
        );
        assert_eq!(
            parse_command("  search   graph neural networks ").unwrap(),
            Some(ReplCommand::Search("graph neural networks".to_string()))
        );
        assert_eq!(parse_command("page 3").unwrap(), Some(ReplCommand::Page(3)));
        assert_eq!(parse_command("get 12").unwrap(), Some(ReplCommand::Get(12)));
    }

    #[test]
    fn parses_bare_commands() {
        assert_eq!(parse_command("next").unwrap(), Some(ReplCommand::Next));
        assert_eq!(parse_command("prev").unwrap(), Some(ReplCommand::Prev));
        assert_eq!(parse_command("refresh").unwrap(), Some(ReplCommand::Refresh));
        assert_eq!(parse_command("all").unwrap(), Some(ReplCommand::All));
        assert_eq!(parse_command("home").unwrap(), Some(ReplCommand::Home));
        assert_eq!(parse_command("q").unwrap(), Some(ReplCommand::Quit));
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_command("cat").is_err());
        assert!(parse_command("search ").is_err());
        assert!(parse_command("page 0").is_err());
        assert!(parse_command("get two").is_err());
        assert!(parse_command("frobnicate").is_err());
    }
}
