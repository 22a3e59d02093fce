use chrono::Utc;
use colored::Colorize;
use timeago::Formatter;
use txtapp::api::{CmdMessage, CmdResult, MessageLevel};
use txtapp::error::{Result, TxtError};
use txtapp::id::created_at;
use txtapp::model::{AliasEntry, Category, ConfigForm, KeyStatus, TxtMsg};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 16;
const INDEX_WIDTH: usize = 6;

pub(super) fn print_json(result: &CmdResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)
        .map_err(|e| TxtError::Io(std::io::Error::other(e)))?;
    println!("{}", json);
    Ok(())
}

/// Human rendering. `full` prints listed messages in full instead of one
/// line each.
pub(super) fn print_result(result: &CmdResult, offset: &str, full: bool) {
    if full {
        print_full(&result.listed, offset);
    } else if !result.listed.is_empty() || no_payload(result) {
        print_rows(&result.listed, offset);
    }
    if !result.affected.is_empty() {
        print_rows(&result.affected, offset);
    }
    if !result.aliases.is_empty() {
        print_aliases(&result.aliases);
    }
    if let Some(count) = result.count {
        println!("{}", count);
    }
    if let Some(config) = &result.config {
        print_config(config);
    }
    if let Some(key) = &result.key {
        print_key(key);
    }
    print_messages(&result.messages);
}

fn no_payload(result: &CmdResult) -> bool {
    result.affected.is_empty()
        && result.aliases.is_empty()
        && result.count.is_none()
        && result.config.is_none()
        && result.key.is_none()
        && result.messages.is_empty()
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
        }
    }
}

fn print_full(msgs: &[TxtMsg], offset: &str) {
    for (i, msg) in msgs.iter().enumerate() {
        if i > 0 {
            println!("\n================================\n");
        }
        let mut header = format!("{} {}", msg.short_index().yellow(), msg.id.dimmed());
        if let Some(alias) = &msg.alias {
            header.push_str(&format!(" [{}]", alias.cyan()));
        }
        println!("{}  {}", header, format_time_ago(&msg.id, offset).trim().dimmed());
        println!("--------------------------------");
        println!("{}", msg.msg);
    }
}

fn print_rows(msgs: &[TxtMsg], offset: &str) {
    if msgs.is_empty() {
        println!("No messages found.");
        return;
    }

    for msg in msgs {
        let idx_str = format!("{:<width$}", msg.short_index(), width = INDEX_WIDTH);
        let alias_str = msg
            .alias
            .as_ref()
            .map(|a| format!(" [{}]", a))
            .unwrap_or_default();

        let preview: String = msg
            .msg
            .chars()
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();

        let fixed_width = INDEX_WIDTH + alias_str.width() + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed_width);
        let text = truncate_to_width(&preview, available);
        let padding = available.saturating_sub(text.width());

        let idx_colored = match msg.cat {
            Category::Permanent => idx_str.yellow(),
            Category::Temporary => idx_str.normal(),
        };

        println!(
            "{}{}{}{}{}",
            idx_colored,
            text,
            alias_str.cyan(),
            " ".repeat(padding),
            format_time_ago(&msg.id, offset).dimmed()
        );
    }
}

fn print_aliases(aliases: &[AliasEntry]) {
    let width = aliases.iter().map(|a| a.alias.width()).max().unwrap_or(0);
    for entry in aliases {
        let pad = width.saturating_sub(entry.alias.width());
        println!(
            "{}{}  {}",
            entry.alias.cyan(),
            " ".repeat(pad),
            entry.msg_id.dimmed()
        );
    }
}

fn print_config(config: &ConfigForm) {
    println!("key-max-age     {} days", config.key_max_age_days);
    println!("msg-size-limit  {} bytes", config.msg_size_limit);
    println!("temp-limit      {}", config.temp_limit);
    println!("page-limit      {}", config.every_page_limit);
    println!("time-offset     {}", config.time_offset);
}

fn print_key(key: &KeyStatus) {
    let state = if key.is_good {
        "valid".green()
    } else {
        "expired".red()
    };
    println!("{} ({})", key.key.bold(), state);
    println!(
        "max age {} days, expires {}",
        key.max_age_days,
        chrono::DateTime::from_timestamp(key.expires, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| key.expires.to_string())
    );
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

/// How long ago the message with `id` was created, right aligned.
fn format_time_ago(id: &str, offset: &str) -> String {
    let time_str = match created_at(id, offset) {
        Some(created) => {
            let elapsed = Utc::now().signed_duration_since(created);
            Formatter::new().convert(elapsed.to_std().unwrap_or_default())
        }
        None => String::new(),
    };
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
