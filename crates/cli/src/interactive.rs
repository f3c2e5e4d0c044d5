//! Menu-driven session offering every action as a prompted form.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::{
    actions::{self, BookForm},
    client::CatalogClient,
};

const MENU: &str = concat!(
    "\n[1] Add a book  [2] Search by title  [3] Submit review",
    "  [4] Refresh list  [q] Quit"
);

struct Prompter<R, W> {
    lines: Lines<R>,
    out: W,
}

impl<R, W> Prompter<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    /// `None` once input is exhausted.
    async fn ask(&mut self, label: &str) -> anyhow::Result<Option<String>> {
        write!(self.out, "{label}: ")?;
        self.out.flush()?;
        Ok(self.lines.next_line().await?)
    }

    fn say(&mut self, text: impl std::fmt::Display) -> anyhow::Result<()> {
        writeln!(self.out, "{text}")?;
        Ok(())
    }
}

/// Run the session until `q` or end of input.
pub async fn run<R, W>(client: &CatalogClient, input: R, out: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut prompt = Prompter {
        lines: input.lines(),
        out,
    };

    prompt.say("📚 Book Review Portal")?;
    loop {
        prompt.say(MENU)?;
        let Some(choice) = prompt.ask("Choose").await? else {
            return Ok(());
        };

        match choice.trim() {
            "1" => {
                let mut form = BookForm::default();
                for (label, field) in [
                    ("Title", &mut form.title),
                    ("Author", &mut form.author),
                    ("Description", &mut form.description),
                    ("Rating (1-5)", &mut form.rating),
                    ("Local cover image filename (optional)", &mut form.cover_file),
                ] {
                    let Some(value) = prompt.ask(label).await? else {
                        return Ok(());
                    };
                    *field = value;
                }

                let feedback = actions::add_book(client, &form).await;
                let added = feedback.ok;
                prompt.say(feedback)?;
                if added {
                    prompt.say(actions::refresh(client, "").await)?;
                }
            }
            "2" => {
                let Some(title) = prompt.ask("Title").await? else {
                    return Ok(());
                };
                prompt.say(actions::search(client, &title).await)?;
            }
            "3" => {
                let Some(title) = prompt.ask("Book title").await? else {
                    return Ok(());
                };
                let Some(review) = prompt.ask("Review").await? else {
                    return Ok(());
                };
                prompt.say(actions::review(client, &title, &review).await)?;
            }
            "4" => {
                let Some(min_rating) = prompt.ask("Min rating (blank for all)").await? else {
                    return Ok(());
                };
                prompt.say(actions::refresh(client, &min_rating).await)?;
            }
            "q" | "Q" => return Ok(()),
            other => prompt.say(format!("Unknown choice '{other}'"))?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn session(input: &str) -> String {
        let client = CatalogClient::new("http://127.0.0.1:9").unwrap();
        let mut out = Vec::new();
        run(&client, input.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn quits_on_q() {
        let output = session("q\n").await;
        assert!(output.contains("Book Review Portal"));
        assert_eq!(output.matches("Choose:").count(), 1);
    }

    #[tokio::test]
    async fn ends_with_input() {
        let output = session("").await;
        assert!(output.contains("Choose:"));
    }

    #[tokio::test]
    async fn review_form_validates_locally() {
        let output = session("3\nDune\n\nq\n").await;
        assert!(output.contains("❌ Please provide both title and review"));
    }

    #[tokio::test]
    async fn unknown_choices_are_reported() {
        let output = session("7\nq\n").await;
        assert!(output.contains("Unknown choice '7'"));
    }
}
