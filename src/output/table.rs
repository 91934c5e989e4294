//! Terminal renderer: a padded, colored table.
//!
//! Columns are Name, Email, Department and ID, each as wide as its
//! longest value.

use colored::Colorize;

use crate::models::User;
use crate::output::OutputRenderer;

const HEADERS: [&str; 4] = ["Name", "Email", "Department", "ID"];

/// Terminal table renderer.
pub struct TableRenderer;

impl OutputRenderer for TableRenderer {
    fn render(&self, users: &[User]) -> String {
        if users.is_empty() {
            return format!("  {}\n", "No users found".dimmed());
        }

        let rows: Vec<[String; 4]> = users
            .iter()
            .map(|u| {
                [
                    u.name.clone(),
                    u.email.clone(),
                    u.department.clone().unwrap_or_default(),
                    u.id.to_string(),
                ]
            })
            .collect();

        let mut widths = HEADERS.map(|h| h.chars().count());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut output = String::new();
        let header = pad_row(&HEADERS.map(String::from), &widths);
        output.push_str(&format!("  {}\n", header.bold()));
        let rule_len = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
        output.push_str(&format!("  {}\n", "─".repeat(rule_len).dimmed()));

        for row in &rows {
            output.push_str(&format!("  {}\n", pad_row(row, &widths)));
        }

        let noun = if users.len() == 1 { "user" } else { "users" };
        output.push_str(&format!(
            "\n  {}\n",
            format!("{} {noun}", users.len()).dimmed()
        ));
        output
    }
}

fn pad_row(cells: &[String; 4], widths: &[usize; 4]) -> String {
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        let fill = width.saturating_sub(cell.chars().count());
        line.push_str(cell);
        // Last column is not padded so lines carry no trailing spaces.
        if i + 1 < cells.len() {
            line.push_str(&" ".repeat(fill));
        }
    }
    line
}
