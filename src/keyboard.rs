//! Reply keyboards and button labels
//!
//! Labels are echoed back verbatim by the chat client when a button is
//! pressed, so the dispatcher matches on these exact strings.

pub const START_COMMAND: &str = "/start";
pub const ECHO_MODE: &str = "🗣 Echo Mode";
pub const REVERSE_MODE: &str = "🔁 Reverse Mode";
pub const AGE_MODE: &str = "🕓 Age in Seconds";
pub const CURRENCY_RATES: &str = "💰 Currency Rates";

pub const TIME_YES: &str = "Yes 🕐";
pub const TIME_SKIP: &str = "Skip ⏭️";

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const MONTHS_PER_ROW: usize = 4;

/// Ordered rows of button labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    rows: Vec<Vec<String>>,
}

impl Keyboard {
    pub fn new<R, L>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = L>,
        L: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

/// Whether a reply replaces the client's keyboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyKeyboard {
    /// Plain text; the client keeps whatever keyboard it shows
    Keep,
    Show(Keyboard),
}

/// One outbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: ReplyKeyboard,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: ReplyKeyboard::Keep,
        }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            text: text.into(),
            keyboard: ReplyKeyboard::Show(keyboard),
        }
    }

    pub fn with_main_menu(text: impl Into<String>) -> Self {
        Self::with_keyboard(text, main_menu())
    }

    pub fn keyboard(&self) -> Option<&Keyboard> {
        match &self.keyboard {
            ReplyKeyboard::Keep => None,
            ReplyKeyboard::Show(k) => Some(k),
        }
    }
}

pub fn main_menu() -> Keyboard {
    Keyboard::new([[ECHO_MODE, REVERSE_MODE], [AGE_MODE, CURRENCY_RATES]])
}

/// Twelve month buttons, four per row
pub fn month_picker() -> Keyboard {
    Keyboard::new(MONTH_LABELS.chunks(MONTHS_PER_ROW).map(<[&str]>::to_vec))
}

pub fn time_choice() -> Keyboard {
    Keyboard::new([[TIME_YES, TIME_SKIP]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_menu_layout() {
        let menu = main_menu();
        assert_eq!(menu.rows().len(), 2);
        assert_eq!(menu.rows()[0], vec![ECHO_MODE, REVERSE_MODE]);
        assert_eq!(menu.rows()[1], vec![AGE_MODE, CURRENCY_RATES]);
    }

    #[test]
    fn test_month_picker_has_three_rows_of_four() {
        let picker = month_picker();
        assert_eq!(picker.rows().len(), 3);
        assert!(picker.rows().iter().all(|row| row.len() == 4));
        assert_eq!(picker.rows()[2][3], "Dec");
    }

    #[test]
    fn test_plain_reply_has_no_keyboard() {
        assert!(Reply::plain("hi").keyboard().is_none());
        assert_eq!(Reply::with_main_menu("hi").keyboard(), Some(&main_menu()));
    }
}
