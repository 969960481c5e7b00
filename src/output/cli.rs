use crate::model::{DiscoverResponse, GameInfo};
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct GameRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Size MB")]
    size_mb: u64,
    #[tabled(rename = "Hours")]
    hours: String,
    #[tabled(rename = "Last Active")]
    last_active: String,
    #[tabled(rename = "Executable")]
    executable: String,
}

impl From<&GameInfo> for GameRow {
    fn from(game: &GameInfo) -> Self {
        Self {
            name: truncate(&game.name, 40),
            source: game.source.clone(),
            size_mb: game.size_mb,
            hours: game
                .usage_hours
                .map(|h| format!("{:.1}", h))
                .unwrap_or_else(|| "-".to_string()),
            last_active: game.last_active.clone().unwrap_or_else(|| "-".to_string()),
            executable: game
                .executable
                .as_deref()
                .map(|e| truncate_left(e, 50))
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

pub fn print_cli_table(response: &DiscoverResponse) -> Result<()> {
    println!();

    if response.games.is_empty() {
        println!("No games found.");
        return Ok(());
    }

    println!("Found {} games:", response.total);
    println!();

    let rows: Vec<GameRow> = response.games.iter().map(GameRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
    println!();

    print_summary(response);
    Ok(())
}

pub fn print_game_details(games: &[GameInfo]) -> Result<()> {
    for game in games {
        println!();
        println!("{}", game.name);
        println!("  Source:       {}", game.source);
        println!("  Location:     {}", game.install_path);
        println!(
            "  Executable:   {}",
            game.executable.as_deref().unwrap_or("-")
        );
        println!("  Size:         {} MB", game.size_mb);
        println!(
            "  Installed:    {}",
            game.install_date.as_deref().unwrap_or("-")
        );
        println!(
            "  Last active:  {}",
            game.last_active.as_deref().unwrap_or("-")
        );
        match game.usage_hours {
            Some(hours) => println!("  Hours:        {:.1}", hours),
            None => println!("  Hours:        -"),
        }
    }
    println!();
    Ok(())
}

fn print_summary(response: &DiscoverResponse) {
    println!("Summary:");
    println!("  Total games: {}", response.total);

    if response.by_source.len() > 1 {
        let source_summary: Vec<String> = response
            .by_source
            .iter()
            .map(|(s, c)| format!("{} {}", c, s))
            .collect();
        println!("  By source: {}", source_summary.join(", "));
    }

    let launchable = response
        .games
        .iter()
        .filter(|g| g.executable.is_some())
        .count();
    if launchable < response.total {
        println!("  Without executable: {}", response.total - launchable);
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

/// Keeps the end of a path, where the file name is.
fn truncate_left(s: &str, max_len: usize) -> String {
    let count = s.chars().count();
    if count <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().skip(count - (max_len - 3)).collect();
        format!("...{}", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Portal 2", 40), "Portal 2");
        assert_eq!(truncate("abcdefghij", 6), "abc...");
        assert_eq!(truncate("ÄÖÜäöüß", 5), "ÄÖ...");
    }

    #[test]
    fn test_truncate_left_keeps_file_name() {
        assert_eq!(truncate_left("/games/hades/Hades.exe", 12), "...Hades.exe");
    }

    #[test]
    fn test_row_placeholders() {
        let game = GameInfo {
            name: "Hades".to_string(),
            source: "GOG".to_string(),
            install_path: "/games/hades".to_string(),
            executable: None,
            install_date: None,
            size_mb: 12,
            last_active: None,
            usage_hours: Some(1.26),
        };
        let row = GameRow::from(&game);
        assert_eq!(row.hours, "1.3");
        assert_eq!(row.executable, "-");
        assert_eq!(row.last_active, "-");
    }
}
