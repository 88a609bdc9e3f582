//! Interactive stdin prompts

use std::io::{self, BufRead, Write};

/// Ask for a line of input
pub fn prompt_line(message: &str) -> io::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

/// Ask a yes/no question; anything but an explicit yes counts as no
pub fn confirm(message: &str) -> io::Result<bool> {
    let answer = prompt_line(message)?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}
