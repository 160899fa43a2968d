use inquire::{InquireError, Text};
use weather_core::City;

use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Exit,
    /// Zero-based index into the city table.
    City(usize),
    All,
}

/// `0` exits, `1..=n` picks a city, `n + 1` picks all of them.
pub fn parse_choice(input: &str, city_count: usize) -> Option<MenuChoice> {
    let n: usize = input.trim().parse().ok()?;
    match n {
        0 => Some(MenuChoice::Exit),
        n if n <= city_count => Some(MenuChoice::City(n - 1)),
        n if n == city_count + 1 => Some(MenuChoice::All),
        _ => None,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Line(String),
    Quit,
}

/// Ctrl-C and Esc end the menu; other prompt failures are errors.
fn classify(result: Result<String, InquireError>) -> anyhow::Result<Input> {
    match result {
        Ok(line) => Ok(Input::Line(line)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(Input::Quit),
        Err(e) => Err(e.into()),
    }
}

/// Reads one line off the async workers, since the prompt blocks on the terminal.
async fn read_line(prompt: &str) -> anyhow::Result<Input> {
    let prompt = prompt.to_string();
    let result = tokio::task::spawn_blocking(move || Text::new(&prompt).prompt()).await?;
    classify(result)
}

pub fn render_menu(cities: &[City]) -> String {
    let mut out = String::from("📍 CHOOSE A CITY:\n");
    for (i, city) in cities.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, city.name));
    }
    out.push_str(&format!("{}. All {} cities\n", cities.len() + 1, cities.len()));
    out.push_str("0. Exit");
    out
}

pub async fn run(session: &Session, cities: &[City]) -> anyhow::Result<()> {
    let max = cities.len() + 1;
    let prompt = format!("Enter your choice (0-{max}):");

    loop {
        println!("{}", render_menu(cities));

        let input = match read_line(&prompt).await? {
            Input::Line(line) => line,
            Input::Quit => {
                println!("\n👋 Goodbye!");
                return Ok(());
            }
        };

        match parse_choice(&input, cities.len()) {
            Some(MenuChoice::Exit) => {
                println!("👋 Goodbye!");
                return Ok(());
            }
            Some(MenuChoice::City(i)) => {
                session.process(&cities[i..=i]).await;
                println!("🎉 Done with the selected city!\n");
            }
            Some(MenuChoice::All) => {
                session.process(cities).await;
                println!("🎉 Done with all selected cities!\n");
            }
            None => println!("❌ Invalid choice! Please enter a number from 0 to {max}.\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_valid_choice() {
        assert_eq!(parse_choice("0", 3), Some(MenuChoice::Exit));
        assert_eq!(parse_choice("1", 3), Some(MenuChoice::City(0)));
        assert_eq!(parse_choice(" 3 ", 3), Some(MenuChoice::City(2)));
        assert_eq!(parse_choice("4", 3), Some(MenuChoice::All));
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        for bad in ["5", "-1", "", "abc", "1.5"] {
            assert_eq!(parse_choice(bad, 3), None, "input {bad:?}");
        }
    }

    #[test]
    fn all_option_follows_table_size() {
        assert_eq!(parse_choice("6", 5), Some(MenuChoice::All));
        assert_eq!(parse_choice("2", 1), Some(MenuChoice::All));
    }

    #[test]
    fn ctrl_c_and_esc_quit_the_menu() {
        assert_eq!(classify(Err(InquireError::OperationInterrupted)).unwrap(), Input::Quit);
        assert_eq!(classify(Err(InquireError::OperationCanceled)).unwrap(), Input::Quit);
        assert_eq!(classify(Ok(" 2 ".into())).unwrap(), Input::Line(" 2 ".into()));
    }

    #[test]
    fn broken_terminal_is_an_error() {
        assert!(classify(Err(InquireError::NotTTY)).is_err());
    }

    #[test]
    fn menu_lists_cities_in_order() {
        let cities = [City::new("Ninh Bình", 20.2506, 105.9745), City::new("Hà Nội", 21.0278, 105.8342)];
        let menu = render_menu(&cities);

        assert!(menu.contains("1. Ninh Bình\n2. Hà Nội\n3. All 2 cities\n0. Exit"));
    }
}
