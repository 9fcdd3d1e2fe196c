//! Terminal rendering of a session.

use comfy_table::{Cell, Table};

use analogy_core::display::{
    choice_text, format_stem_for_display, progress_fraction, progress_text, type_tag, DevInfo,
};
use analogy_core::recorder::LocalizationField;
use analogy_core::scoring::Score;
use analogy_core::statistics::ResponseTimeStats;
use analogy_core::{ChoiceKey, Session, SessionMode};

/// The current item with its options, or the end screen.
pub fn render(session: &Session) -> String {
    let Some(item) = session.current_item() else {
        return render_finished(session);
    };
    let idx = session.index().unwrap_or_default();
    let lang = session.lang();
    let chosen = session.responses().chosen(&item.id);

    let len = session.form().len();
    let mut out = format!(
        "\n[{}] {} {} {}\n{}\n",
        progress_text(idx, len),
        type_tag(item),
        lang,
        progress_bar(progress_fraction(idx, len)),
        format_stem_for_display(item, lang)
    );
    for key in ChoiceKey::ALL {
        let marker = if chosen == Some(key) { " <" } else { "" };
        out.push_str(&format!("  {key}) {}{marker}\n", choice_text(item, key, lang)));
    }

    if session.dev_mode() {
        let info = DevInfo {
            item,
            response: session.responses().get(&item.id),
        };
        out.push_str(&format!("--\n{info}"));
    }

    if session.mode() == SessionMode::Review {
        if let Some(record) = session.localization().get(&item.id) {
            for field in LocalizationField::ALL {
                let value = record.get(field);
                if !value.trim().is_empty() {
                    out.push_str(&format!("  {field}: {value}\n"));
                }
            }
        }
    }
    out
}

const BAR_WIDTH: usize = 20;

/// `|#####...............|` for a completed share in `0.0..=1.0`.
fn progress_bar(fraction: f64) -> String {
    let filled = ((fraction * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("|{}{}|", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn render_finished(session: &Session) -> String {
    format!(
        "\nFinished: {} of {} items answered.\n",
        session.responses().len(),
        session.form().len()
    )
}

/// Score summary as a table.
pub fn score_table(score: &Score, rt: &ResponseTimeStats) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Raw",
        "Fixed correct",
        "Fixed %",
        "Rotation answered",
        "Mean RT",
        "Median RT",
    ]);
    table.add_row(vec![
        Cell::new(score.raw()),
        Cell::new(format!("{}/{}", score.fixed_correct, score.fixed_total)),
        Cell::new(format!("{:.1}%", score.fixed_rate() * 100.0)),
        Cell::new(score.rotation_answered),
        Cell::new(format!("{:.0}ms", rt.mean_ms)),
        Cell::new(format!("{:.0}ms", rt.median_ms)),
    ]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use analogy_core::parser::parse_bank_str;
    use analogy_core::traits::SystemClock;
    use analogy_core::SessionConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    const BANK: &str = r#"{
        "meta": { "bank_version": "v1" },
        "items": [
            { "ITEM_ID": "I1", "ITEM_TYPE": "FIXED", "ANSWER_KEY": "B",
              "STEM_TR": "kuş:uçmak", "STEM_EN": "bird:fly",
              "A_TR": "balık", "A_EN": "fish", "B_TR": "balık:yüzmek", "B_EN": "fish:swim",
              "C_TR": "c", "C_EN": "c", "D_TR": "d", "D_EN": "d", "E_TR": "e", "E_EN": "e" }
        ]
    }"#;

    fn start(config: SessionConfig) -> Session {
        let bank = Arc::new(parse_bank_str(BANK).unwrap());
        Session::start(bank, config, Arc::new(SystemClock::new()), &mut StdRng::seed_from_u64(1))
    }

    #[test]
    fn item_screen_follows_language_and_selection() {
        let mut session = start(SessionConfig::review());
        let screen = render(&session);
        assert!(screen.contains("[item 1 / 1] fixed TR"));
        assert!(screen.contains("kuş : uçmak :: ? : ?"));
        assert!(screen.contains("  A) balık\n"));

        session.select(ChoiceKey::B).unwrap();
        session.set_lang(analogy_core::Lang::En);
        let screen = render(&session);
        assert!(screen.contains("bird : fly :: ? : ?"));
        assert!(screen.contains("  B) fish:swim <"));
        assert!(!screen.contains("ANSWER_KEY"));
    }

    #[test]
    fn dev_and_localization_blocks() {
        let mut session = start(SessionConfig::review());
        session.set_dev_mode(true);
        session
            .edit_localization(LocalizationField::Note, "ton fazla resmi")
            .unwrap();
        let screen = render(&session);
        assert!(screen.contains("ANSWER_KEY: B"));
        assert!(screen.contains("note: ton fazla resmi"));
    }

    #[test]
    fn progress_bar_fills_with_position() {
        assert_eq!(progress_bar(0.0), format!("|{}|", ".".repeat(20)));
        assert_eq!(progress_bar(0.5), format!("|{}{}|", "#".repeat(10), ".".repeat(10)));
        assert_eq!(progress_bar(1.0), format!("|{}|", "#".repeat(20)));

        let session = start(SessionConfig::review());
        assert!(render(&session).contains(&format!("[item 1 / 1] fixed TR |{}|", "#".repeat(20))));
    }

    #[test]
    fn finished_screen() {
        let mut session = start(SessionConfig::review());
        session.finish();
        assert!(render(&session).contains("Finished: 0 of 1 items answered."));
    }

    #[test]
    fn table_lists_score() {
        let score = Score {
            fixed_total: 3,
            fixed_correct: 2,
            rotation_answered: 1,
        };
        let text = score_table(&score, &ResponseTimeStats::default()).to_string();
        assert!(text.contains("2/3"));
        assert!(text.contains("66.7%"));
    }
}
