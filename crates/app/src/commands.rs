//! Authoring subcommands: list, import, validate, edit and export sets.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, bail};
use quiz_core::{Question, QuestionDraft, QuizName};
use services::AppServices;

fn read_source(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Print every set with its size.
pub async fn list(services: &AppServices, out: &mut impl Write) -> anyhow::Result<()> {
    let items = services.authoring().list_sets().await?;
    if items.is_empty() {
        writeln!(out, "No question sets.")?;
        return Ok(());
    }
    for item in items {
        let origin = if item.bundled { "bundled" } else { "yours" };
        write!(
            out,
            "{:<20} {:>3} questions  [{origin}]  {}",
            item.name.as_str(),
            item.question_count,
            item.title
        )?;
        match item.description {
            Some(description) => writeln!(out, ": {description}")?,
            None => writeln!(out)?,
        }
    }
    Ok(())
}

/// Import a JSON question file as a new set.
pub async fn create(
    services: &AppServices,
    name: &QuizName,
    file: &Path,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let json = read_source(file)?;
    let count = services.authoring().create_from_json(name, &json).await?;
    writeln!(out, "Saved {count} questions as `{name}`.")?;
    Ok(())
}

/// Check a JSON question file and preview it without saving.
pub fn validate(services: &AppServices, file: &Path, out: &mut impl Write) -> anyhow::Result<()> {
    let json = read_source(file)?;
    let questions = services.authoring().validate_json(&json)?;
    writeln!(out, "{} valid questions:", questions.len())?;
    print_questions(&questions, out)?;
    Ok(())
}

fn print_questions(questions: &[Question], out: &mut impl Write) -> std::io::Result<()> {
    for (idx, question) in questions.iter().enumerate() {
        writeln!(out, "{:>3}. {}", idx + 1, question.text())?;
        for option in question.options() {
            let mark = if option == question.answer() { "*" } else { "-" };
            writeln!(out, "     {mark} {option}")?;
        }
        writeln!(out, "     answer: {}", question.answer())?;
        if !question.explanation().is_empty() {
            writeln!(out, "     explanation: {}", question.explanation())?;
        }
        if let Some(example) = question.example() {
            writeln!(out, "     example: {example}")?;
        }
    }
    Ok(())
}

fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    label: &str,
) -> anyhow::Result<String> {
    write!(out, "{label}: ")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("input ended before `{label}` was entered");
    }
    Ok(line.trim().to_owned())
}

/// Read one question from a form and append it to `name`.
pub async fn add<R: BufRead, W: Write>(
    services: &AppServices,
    name: &QuizName,
    mut input: R,
    out: &mut W,
) -> anyhow::Result<()> {
    let text = prompt(&mut input, out, "Question")?;
    writeln!(out, "Options, one per line; empty line to finish.")?;
    let mut options = Vec::new();
    loop {
        let option = prompt(&mut input, out, &format!("Option {}", options.len() + 1))?;
        if option.is_empty() {
            break;
        }
        options.push(option);
    }
    let answer = prompt(&mut input, out, "Correct answer")?;
    let explanation = prompt(&mut input, out, "Explanation")?;
    let example = prompt(&mut input, out, "Example (optional)")?;

    let draft = QuestionDraft {
        text,
        options,
        answer,
        explanation,
        example: (!example.is_empty()).then_some(example),
    };
    let count = services.authoring().add_question(name, draft).await?;
    writeln!(out, "Added. `{name}` now has {count} questions.")?;
    Ok(())
}

/// Remove the question shown at 1-based `number`.
pub async fn remove_question(
    services: &AppServices,
    name: &QuizName,
    number: usize,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let Some(index) = number.checked_sub(1) else {
        bail!("question numbers start at 1");
    };
    let removed = services.authoring().delete_question(name, index).await?;
    writeln!(out, "Removed \"{}\" from `{name}`.", removed.text())?;
    Ok(())
}

pub async fn delete(
    services: &AppServices,
    name: &QuizName,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    services.authoring().delete_set(name).await?;
    writeln!(out, "Deleted `{name}`.")?;
    Ok(())
}

/// Write a set as authoring JSON to `target`, or to `out` when `None`.
pub async fn export(
    services: &AppServices,
    name: &QuizName,
    target: Option<&Path>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let json = services.authoring().export_json(name).await?;
    match target {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))
                .with_context(|| format!("writing {}", path.display()))?;
            writeln!(out, "Exported `{name}` to {}.", path.display())?;
        }
        None => writeln!(out, "{json}")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn name(s: &str) -> QuizName {
        QuizName::new(s).unwrap()
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    const SET: &str = r#"[
        {"question": "2 + 2?", "options": ["3", "4"], "answer": "4", "explanation": "sum"},
        {"question": "3 * 3?", "options": ["9", "6"], "answer": "9", "explanation": "product"}
    ]"#;

    #[tokio::test]
    async fn create_export_and_list() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = dir.path().join("maths.json");
        std::fs::write(&source, SET).unwrap();
        let services = AppServices::in_memory(None);

        let mut out = Vec::new();
        create(&services, &name("maths"), &source, &mut out).await.unwrap();
        assert!(output(out).contains("Saved 2 questions as `maths`."));

        let target = dir.path().join("export.json");
        export(&services, &name("maths"), Some(&target), &mut Vec::new())
            .await
            .unwrap();
        let exported = std::fs::read_to_string(&target).unwrap();
        assert_eq!(services.authoring().validate_json(&exported).unwrap().len(), 2);

        let mut out = Vec::new();
        list(&services, &mut out).await.unwrap();
        let listing = output(out);
        assert!(listing.contains("maths"));
        assert!(listing.contains("[yours]"));
        assert!(listing.contains("[bundled]"));
    }

    #[test]
    fn validate_previews_without_saving() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = dir.path().join("maths.json");
        std::fs::write(&source, SET).unwrap();

        let mut out = Vec::new();
        validate(&AppServices::in_memory(None), &source, &mut out).unwrap();
        let preview = output(out);
        assert!(preview.contains("2 valid questions:"));
        assert!(preview.contains("  1. 2 + 2?"));
        assert!(preview.contains("answer: 9"));
        assert!(preview.contains("     * 4"));
        assert!(preview.contains("     - 3"));
        assert!(preview.contains("explanation: product"));
    }

    #[test]
    fn validate_reports_bad_records() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = dir.path().join("bad.json");
        std::fs::write(&source, r#"{"question": "no array"}"#).unwrap();

        let err = validate(&AppServices::in_memory(None), &source, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[tokio::test]
    async fn add_reads_the_form() {
        let services = AppServices::in_memory(None);
        let form = "Capital of Peru?\nLima\nCusco\n\nLima\nIt is Lima.\n\n";

        let mut out = Vec::new();
        add(&services, &name("geo"), Cursor::new(form), &mut out)
            .await
            .unwrap();
        assert!(output(out).contains("`geo` now has 1 questions."));

        let questions = services.authoring().questions(&name("geo")).await.unwrap();
        assert_eq!(questions[0].options(), ["Lima", "Cusco"]);
        assert_eq!(questions[0].example(), None);
    }

    #[tokio::test]
    async fn add_stops_on_truncated_input() {
        let services = AppServices::in_memory(None);
        let err = add(&services, &name("geo"), Cursor::new("Q?\nA\n"), &mut Vec::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("input ended"));
    }

    #[tokio::test]
    async fn remove_question_is_one_based() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = dir.path().join("maths.json");
        std::fs::write(&source, SET).unwrap();
        let services = AppServices::in_memory(None);
        create(&services, &name("maths"), &source, &mut Vec::new())
            .await
            .unwrap();

        assert!(
            remove_question(&services, &name("maths"), 0, &mut Vec::new())
                .await
                .is_err()
        );
        let mut out = Vec::new();
        remove_question(&services, &name("maths"), 2, &mut out)
            .await
            .unwrap();
        assert!(output(out).contains("Removed \"3 * 3?\""));
    }
}
