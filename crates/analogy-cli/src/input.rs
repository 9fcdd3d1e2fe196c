//! Parsing of interactive session lines.

use analogy_core::recorder::LocalizationField;
use analogy_core::ChoiceKey;

/// One line typed during a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Select(ChoiceKey),
    Next,
    Back,
    ToggleLang,
    ToggleDev,
    /// Print the attempt payload.
    Panel,
    SaveAttempt,
    SaveLocalization,
    Finish,
    Restart,
    Quit,
    Help,
    Edit(LocalizationField, String),
    Unknown(String),
}

impl Input {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();

        if let Some(rest) = trimmed.strip_prefix(':') {
            let (name, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            return match name.parse::<LocalizationField>() {
                Ok(field) => Input::Edit(field, value.trim().to_string()),
                Err(_) => Input::Unknown(trimmed.to_string()),
            };
        }

        match trimmed.to_lowercase().as_str() {
            "" | "n" | ">" | "next" => Input::Next,
            "p" | "<" | "back" => Input::Back,
            "l" | "lang" => Input::ToggleLang,
            "v" | "dev" => Input::ToggleDev,
            "r" | "panel" => Input::Panel,
            "s" | "save" => Input::SaveAttempt,
            "x" | "export" => Input::SaveLocalization,
            "f" | "finish" => Input::Finish,
            "restart" => Input::Restart,
            "q" | "quit" => Input::Quit,
            "?" | "h" | "help" => Input::Help,
            other => match other.parse::<ChoiceKey>() {
                Ok(key) => Input::Select(key),
                Err(_) => Input::Unknown(trimmed.to_string()),
            },
        }
    }
}

pub const HELP: &str = "\
a-e        choose an option
n > enter  next item
p <        previous item
l          toggle TR/EN
v          toggle dev info
r          show the attempt payload
s          save the attempt
x          save localization edits
f          finish
restart    start a new attempt
q          quit without saving
:stem TEXT, :a TEXT .. :e TEXT, :note TEXT
           localization suggestion for the current item (review)";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_and_navigation() {
        assert_eq!(Input::parse("a"), Input::Select(ChoiceKey::A));
        assert_eq!(Input::parse(" E "), Input::Select(ChoiceKey::E));
        assert_eq!(Input::parse(""), Input::Next);
        assert_eq!(Input::parse(">"), Input::Next);
        assert_eq!(Input::parse("<"), Input::Back);
        assert_eq!(Input::parse("restart"), Input::Restart);
        assert_eq!(Input::parse("q"), Input::Quit);
    }

    #[test]
    fn every_choice_letter_selects() {
        for key in ChoiceKey::ALL {
            assert_eq!(Input::parse(&key.to_string().to_lowercase()), Input::Select(key));
        }
        assert_eq!(Input::parse("p"), Input::Back);
        assert_eq!(Input::parse("v"), Input::ToggleDev);
        assert_eq!(Input::parse("f"), Input::Finish);
    }

    #[test]
    fn localization_edits() {
        assert_eq!(
            Input::parse(":stem  kuş : uçmak "),
            Input::Edit(LocalizationField::Stem, "kuş : uçmak".into())
        );
        assert_eq!(
            Input::parse(":c yeni seçenek"),
            Input::Edit(LocalizationField::Choice(ChoiceKey::C), "yeni seçenek".into())
        );
        assert_eq!(
            Input::parse(":note"),
            Input::Edit(LocalizationField::Note, String::new())
        );
        assert!(matches!(Input::parse(":z text"), Input::Unknown(_)));
    }

    #[test]
    fn unknown_lines() {
        assert_eq!(Input::parse("zz"), Input::Unknown("zz".into()));
    }
}
