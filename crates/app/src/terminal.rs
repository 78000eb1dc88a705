//! Line-based terminal front-end for a quiz run.

use std::io::{BufRead, Write};

use quiz_core::{Advance, Selection, SessionError, SessionSnapshot, SessionStatus};
use services::{QuizRun, QuizService, QuizServiceError};

/// One line typed at the quiz prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// 1-based option number.
    Choose(usize),
    Next,
    Restart,
    Quit,
    Unknown(String),
}

impl Input {
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" | "n" | "next" => Self::Next,
            "r" | "restart" => Self::Restart,
            "q" | "quit" | "exit" => Self::Quit,
            other => other
                .parse()
                .map_or_else(|_| Self::Unknown(trimmed.to_owned()), Self::Choose),
        }
    }
}

/// Draw the current state of a run.
///
/// # Errors
///
/// Propagates write failures.
pub fn render(
    snapshot: &SessionSnapshot,
    title: &str,
    out: &mut impl Write,
) -> std::io::Result<()> {
    writeln!(out)?;
    match snapshot.status {
        SessionStatus::Loading => {
            writeln!(out, "No questions in `{title}` yet.")?;
            writeln!(out, "[q] quit")?;
        }
        SessionStatus::Complete => {
            let passes = snapshot.progress.pass + 1;
            let noun = if passes == 1 { "pass" } else { "passes" };
            writeln!(out, "Quiz complete! Every question answered correctly in {passes} {noun}.")?;
            writeln!(out, "[r] restart  [q] quit")?;
        }
        SessionStatus::Active | SessionStatus::Reviewing => render_question(snapshot, title, out)?,
    }
    Ok(())
}

fn render_question(
    snapshot: &SessionSnapshot,
    title: &str,
    out: &mut impl Write,
) -> std::io::Result<()> {
    let progress = &snapshot.progress;
    if snapshot.status == SessionStatus::Reviewing {
        write!(out, "{title} · review {} · ", progress.pass)?;
    } else {
        write!(out, "{title} · ")?;
    }
    write!(out, "question {}/{}", progress.position + 1, progress.total)?;
    if progress.missed > 0 {
        write!(out, " · {} to review", progress.missed)?;
    }
    writeln!(out)?;
    writeln!(out, "{}", snapshot.question.as_deref().unwrap_or_default())?;

    for (idx, option) in snapshot.options.iter().enumerate() {
        let chosen = snapshot.selected.as_deref() == Some(option.as_str());
        let correct = snapshot.correct_answer.as_deref() == Some(option.as_str());
        let mark = match (chosen, correct) {
            (true, true) => " ✓",
            (true, false) => " ✗",
            (false, true) => " ← correct",
            (false, false) => "",
        };
        writeln!(out, "  {}. {option}{mark}", idx + 1)?;
    }

    match snapshot.is_correct {
        None => writeln!(out, "Choose 1-{} (q to quit)", snapshot.options.len())?,
        Some(correct) => {
            writeln!(out, "{}", if correct { "Correct!" } else { "Incorrect." })?;
            if let Some(explanation) = snapshot.explanation.as_deref().filter(|e| !e.is_empty()) {
                writeln!(out, "{explanation}")?;
            }
            if let Some(example) = snapshot.example.as_deref() {
                writeln!(out, "Example: {example}")?;
            }
            writeln!(out, "Press enter for the next question")?;
        }
    }
    Ok(())
}

/// Drive `run` from `input` until the user quits or input ends.
///
/// # Errors
///
/// Fails on I/O errors and on storage errors while restarting.
pub async fn run_quiz<R: BufRead, W: Write>(
    quiz: &QuizService,
    run: &mut QuizRun,
    mut input: R,
    out: &mut W,
) -> anyhow::Result<()> {
    let title = run.name().to_string();
    render(&run.snapshot(), &title, out)?;

    let mut line = String::new();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        match Input::parse(&line) {
            Input::Quit => break,
            Input::Choose(_)
                if matches!(
                    run.session().status(),
                    SessionStatus::Loading | SessionStatus::Complete
                ) =>
            {
                writeln!(out, "Nothing to answer right now.")?;
            }
            Input::Choose(choice) => match quiz.answer_choice(run, choice) {
                Ok(Selection::Ignored) => {
                    writeln!(out, "Already answered. Press enter to continue.")?;
                }
                Ok(_) => render(&run.snapshot(), &title, out)?,
                Err(QuizServiceError::NoSuchOption { count, .. }) => {
                    writeln!(out, "Pick a number from 1 to {count}.")?;
                }
                Err(e) => return Err(e.into()),
            },
            Input::Next => match quiz.advance(run) {
                Ok(Advance::ReviewPass { questions, .. }) => {
                    let noun = if questions == 1 { "question" } else { "questions" };
                    writeln!(out, "Reviewing {questions} missed {noun}.")?;
                    render(&run.snapshot(), &title, out)?;
                }
                Ok(_) => render(&run.snapshot(), &title, out)?,
                Err(QuizServiceError::Session(SessionError::Unanswered)) => {
                    writeln!(out, "Pick an answer first.")?;
                }
                Err(QuizServiceError::Session(SessionError::Completed)) => {
                    writeln!(out, "Quiz complete. Press r to restart or q to quit.")?;
                }
                Err(QuizServiceError::Session(SessionError::Empty)) => {
                    writeln!(out, "No questions to show. Press q to quit.")?;
                }
                Err(e) => return Err(e.into()),
            },
            Input::Restart => {
                quiz.restart(run).await?;
                writeln!(out, "Restarted.")?;
                render(&run.snapshot(), &title, out)?;
            }
            Input::Unknown(raw) => {
                writeln!(out, "Unrecognised input `{raw}`. Enter an option number, n, r or q.")?;
            }
        }
    }
    Ok(())
}
