//! Line-oriented interactive front end over a [`GalleryController`].

use std::{io::Write as _, sync::Arc};

use anyhow::{bail, Context, Result};
use client_core::{FetchOutcome, GalleryController, GalleryEvent};
use shared::domain::{PhotoId, SortKey};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};

use crate::render::{render_detail, render_list, render_status};

pub const HELP: &str = "\
Commands:
  search <term>            start a new search
  sort <relevant|latest>   re-run the current search with another order
  more                     load the next page
  show <n|id>              show details for result n (or a photo id)
  list                     print the current results
  help                     print this help
  quit                     exit
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Search(String),
    Sort(SortKey),
    More,
    Show(String),
    List,
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<ReplCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "search" | "s" => {
            if rest.is_empty() {
                bail!("usage: search <term>");
            }
            ReplCommand::Search(rest.to_string())
        }
        "sort" => ReplCommand::Sort(rest.parse()?),
        "more" | "m" => ReplCommand::More,
        "show" => {
            if rest.is_empty() {
                bail!("usage: show <n|id>");
            }
            ReplCommand::Show(rest.to_string())
        }
        "list" | "ls" => ReplCommand::List,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => bail!("unknown command '{other}', type `help`"),
    };
    Ok(Some(command))
}

/// Runs one command. Returns the text to print, or `None` when the session should end.
pub async fn execute(controller: &GalleryController, command: ReplCommand) -> Option<String> {
    let output = match command {
        ReplCommand::Search(term) => {
            let sort = controller.snapshot().await.active_sort;
            controller.start_search(term, sort).await;
            render_list(&controller.snapshot().await)
        }
        ReplCommand::Sort(sort) => match controller.change_sort(sort).await {
            FetchOutcome::Skipped => format!("Sort order set to {sort}.\n"),
            _ => render_list(&controller.snapshot().await),
        },
        ReplCommand::More => match controller.load_more().await {
            FetchOutcome::Skipped => {
                let snapshot = controller.snapshot().await;
                if snapshot.is_loading {
                    "Still loading, try again shortly.\n".to_string()
                } else {
                    "Nothing more to load.\n".to_string()
                }
            }
            _ => render_list(&controller.snapshot().await),
        },
        ReplCommand::Show(target) => show(controller, &target).await,
        ReplCommand::List => render_list(&controller.snapshot().await),
        ReplCommand::Help => HELP.to_string(),
        ReplCommand::Quit => return None,
    };
    Some(output)
}

async fn show(controller: &GalleryController, target: &str) -> String {
    let item = match target.parse::<usize>() {
        Ok(position) => {
            let snapshot = controller.snapshot().await;
            position
                .checked_sub(1)
                .and_then(|index| snapshot.items.get(index).cloned())
        }
        Err(_) => controller.item(&PhotoId::new(target)).await,
    };
    match item {
        Some(item) => render_detail(&item),
        None => format!("No result '{target}' in the current list.\n"),
    }
}

pub async fn run_interactive(
    controller: Arc<GalleryController>,
    initial_term: String,
    sort: SortKey,
) -> Result<()> {
    let mut events = controller.subscribe_events();
    let status_task = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(GalleryEvent::StateChanged(snapshot)) if snapshot.is_loading => {
                    print!("{}", render_status(&snapshot));
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    });

    println!("{HELP}");
    controller.start_search(initial_term, sort).await;
    print!("{}", render_list(&controller.snapshot().await));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().context("failed to flush stdout")?;
        let Some(line) = lines.next_line().await.context("failed to read input")? else {
            break;
        };
        match parse_command(&line) {
            Ok(None) => {}
            Ok(Some(command)) => match execute(&controller, command).await {
                Some(output) => print!("{output}"),
                None => break,
            },
            Err(err) => println!("{err}"),
        }
    }

    status_task.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use client_core::PhotoSearchApi;
    use shared::{
        domain::{ResultItem, ResultPage, SearchQuery},
        error::TransportError,
    };

    use super::*;

    struct TwoPages;

    #[async_trait]
    impl PhotoSearchApi for TwoPages {
        async fn fetch_page(&self, query: &SearchQuery) -> Result<ResultPage, TransportError> {
            let items = match query.page {
                1 | 2 => vec![ResultItem {
                    id: PhotoId::new(format!("{}-{}", query.term, query.page)),
                    display_text: Some(format!("{} page {}", query.term, query.page)),
                    image_ref: format!("{}.jpg", query.page),
                    attribution: query.sort.to_string(),
                    created_at: None,
                    like_count: Some(3),
                }],
                _ => Vec::new(),
            };
            Ok(ResultPage::new(items))
        }
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("   ").expect("parse"), None);
        assert_eq!(
            parse_command("search  red cats ").expect("parse"),
            Some(ReplCommand::Search("red cats".into()))
        );
        assert_eq!(
            parse_command("sort LATEST").expect("parse"),
            Some(ReplCommand::Sort(SortKey::Latest))
        );
        assert_eq!(parse_command("more").expect("parse"), Some(ReplCommand::More));
        assert_eq!(
            parse_command("show 2").expect("parse"),
            Some(ReplCommand::Show("2".into()))
        );
        assert_eq!(parse_command("q").expect("parse"), Some(ReplCommand::Quit));
    }

    #[test]
    fn rejects_incomplete_or_unknown_commands() {
        assert!(parse_command("search").is_err());
        assert!(parse_command("sort popular").is_err());
        assert!(parse_command("show").is_err());
        let err = parse_command("dance").expect_err("must fail");
        assert!(err.to_string().contains("unknown command 'dance'"));
    }

    #[tokio::test]
    async fn search_more_and_show_flow() {
        let controller = GalleryController::new(Arc::new(TwoPages));

        let listed = execute(&controller, ReplCommand::Search("cats".into()))
            .await
            .expect("output");
        assert!(listed.contains("1. cats page 1 by relevant"));

        let listed = execute(&controller, ReplCommand::More).await.expect("output");
        assert!(listed.contains("2. cats page 2 by relevant"));

        execute(&controller, ReplCommand::More).await;
        let done = execute(&controller, ReplCommand::More).await.expect("output");
        assert_eq!(done, "Nothing more to load.\n");

        let detail = execute(&controller, ReplCommand::Show("2".into()))
            .await
            .expect("output");
        assert!(detail.contains("[cats-2] 2.jpg"));

        let by_id = execute(&controller, ReplCommand::Show("cats-1".into()))
            .await
            .expect("output");
        assert!(by_id.contains("cats page 1"));

        let missing = execute(&controller, ReplCommand::Show("9".into()))
            .await
            .expect("output");
        assert!(missing.contains("No result '9'"));
    }

    #[tokio::test]
    async fn sort_reruns_search_with_new_order() {
        let controller = GalleryController::new(Arc::new(TwoPages));

        let before = execute(&controller, ReplCommand::Sort(SortKey::Latest))
            .await
            .expect("output");
        assert_eq!(before, "Sort order set to latest.\n");

        let listed = execute(&controller, ReplCommand::Search("dogs".into()))
            .await
            .expect("output");
        assert!(listed.contains("dogs page 1 by latest"));

        let resorted = execute(&controller, ReplCommand::Sort(SortKey::Relevant))
            .await
            .expect("output");
        assert!(resorted.contains("sort: relevant"));
    }

    #[tokio::test]
    async fn quit_ends_session() {
        let controller = GalleryController::new(Arc::new(TwoPages));
        assert_eq!(execute(&controller, ReplCommand::Quit).await, None);
    }
}
