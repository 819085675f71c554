// Colored terminal output for search results, deliveries and store status.
//
// main.rs delegates all display formatting here.

use colored::Colorize;

use crate::db::models::{Course, StoreStats, StudentAccount, Teacher};
use crate::pipeline::DeliveryResult;

/// Display teacher search results.
pub fn display_teachers(query: &str, teachers: &[Teacher]) {
    if teachers.is_empty() {
        println!("No teachers match \"{query}\".");
        return;
    }

    println!(
        "\n{}",
        format!("=== Teachers matching \"{query}\" ({}) ===", teachers.len()).bold()
    );
    println!(
        "  {:>5}  {:<32} {:<20} {}",
        "ID".dimmed(),
        "Name".dimmed(),
        "College".dimmed(),
        "Email".dimmed(),
    );
    println!("  {}", "-".repeat(78).dimmed());

    for teacher in teachers {
        println!(
            "  {:>5}  {:<32} {:<20} {}",
            teacher.id,
            super::truncate_chars(&teacher.name, 30),
            super::truncate_chars(&teacher.college, 18),
            teacher.email,
        );
    }
    println!();
}

/// Display course search results with the teachers of each course.
pub fn display_courses(query: &str, courses: &[(Course, Vec<Teacher>)]) {
    if courses.is_empty() {
        println!("No courses match \"{query}\".");
        return;
    }

    println!(
        "\n{}",
        format!("=== Courses matching \"{query}\" ({}) ===", courses.len()).bold()
    );
    println!();

    for (course, teachers) in courses {
        let term = match course.year {
            Some(year) => format!("{} {year}", course.semester),
            None => course.semester.to_string(),
        };
        println!(
            "  {:>5}  {} {} {}",
            course.id,
            course.label().bold(),
            format!("[{}]", course.subject).dimmed(),
            term.dimmed(),
        );
        if !teachers.is_empty() {
            let names: Vec<&str> = teachers.iter().map(|t| t.name.as_str()).collect();
            println!("         taught by {}", names.join(", "));
        }
    }
    println!();
}

/// Display a single teacher.
pub fn display_teacher_detail(teacher: &Teacher) {
    println!("\n{}", format!("=== {} ===", teacher.name).bold());
    println!("  ID:      {}", teacher.id);
    println!("  College: {}", teacher.college);
    println!("  Email:   {}", teacher.email);
}

/// Display the outcome of a message submission.
pub fn display_delivery(result: &DeliveryResult) {
    match result {
        DeliveryResult::Delivered { message_id } => {
            println!(
                "{} Message #{message_id} delivered to the teacher.",
                "✓".green().bold()
            );
        }
        DeliveryResult::Rejected {
            message_id,
            new_infraction_count,
        } => {
            println!(
                "{} Message #{message_id} was flagged as abusive and not delivered.",
                "✗".red().bold()
            );
            println!(
                "  Infractions on this account: {}",
                colorize_infractions(*new_infraction_count)
            );
        }
    }
}

/// Display an account's infraction count.
pub fn display_account(account: &StudentAccount) {
    println!("\n{}", format!("=== {} ===", account.email).bold());
    println!("  ID:          {}", account.id);
    println!(
        "  Infractions: {}",
        colorize_infractions(account.infraction_count)
    );
    println!("  Registered:  {}", account.created_at.dimmed());
}

/// Display aggregate store statistics.
pub fn display_stats(stats: &StoreStats) {
    println!("Accounts: {}", stats.accounts);
    println!("Teachers: {}  Courses: {}", stats.teachers, stats.courses);
    println!(
        "Messages: {} total, {} delivered, {} rejected",
        stats.messages,
        stats.delivered_messages.to_string().green(),
        stats.malicious_messages.to_string().red(),
    );
    let held = stats.messages - stats.delivered_messages - stats.malicious_messages;
    if held > 0 {
        println!(
            "  {} {} held (classifier or mail transport failed)",
            "~".yellow(),
            held
        );
    }
    println!("Infractions recorded: {}", stats.total_infractions);
}

fn colorize_infractions(count: i64) -> colored::ColoredString {
    match count {
        0 => count.to_string().green(),
        1..=2 => count.to_string().yellow(),
        _ => count.to_string().red().bold(),
    }
}
