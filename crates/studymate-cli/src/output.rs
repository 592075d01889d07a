//! Plain-text rendering of domain values.

use studymate_core::{DaySchedule, Peer, PeerKind, Status, Task, User, Worksession};

pub fn print_tasks(tasks: &[Task]) {
    println!("Tasks ({}):", tasks.len());
    println!("{:<36}  {:<8}  {:>4}  {}", "ID", "STATUS", "PROG", "TITLE");
    println!("{}", "-".repeat(80));

    for task in tasks {
        println!(
            "{:<36}  {:<8}  {:>3}%  {}",
            task.id(),
            task.status(),
            task.progress(),
            task.title()
        );
    }
}

pub fn print_task(task: &Task) {
    println!("  ID:         {}", task.id());
    println!("  Title:      {}", task.title());
    println!("  Status:     {}", task.status());
    println!("  Progress:   {}% {}", task.progress(), progress_bar(task.progress()));
    println!("  Assignee:   {}", task.assignee());

    if !task.subtasks().is_empty() {
        println!("  Subtasks:");
        for subtask in task.subtasks() {
            println!(
                "    {} {} ({}, {})",
                checkbox(subtask.status),
                subtask.title,
                subtask.id,
                subtask.status
            );
        }
    }
}

pub fn print_peers(peers: &[Peer]) {
    println!("Peers ({}):", peers.len());
    println!("{:<36}  {:<6}  {:<24}  {}", "ID", "KIND", "NAME", "DETAILS");
    println!("{}", "-".repeat(80));

    for peer in peers {
        let details = match peer.kind {
            PeerKind::Group => format!("{} members", peer.members.unwrap_or(0)),
            _ => peer.education.clone().unwrap_or_default(),
        };
        println!(
            "{:<36}  {:<6}  {:<24}  {}",
            peer.id,
            kind_name(peer.kind),
            peer.name,
            details
        );
    }
}

pub fn print_user(user: &User) {
    println!("  ID:         {}", user.id);
    println!("  Name:       {}", user.display_name());
    println!("  Username:   {}", user.username);
    if let Some(education) = user.profile.as_ref().and_then(|p| p.education.as_deref()) {
        println!("  Education:  {}", education);
    }
}

pub fn print_week(week: &[DaySchedule]) {
    for day in week {
        println!("{} ({})", day.label, day.key);
        if day.sessions.is_empty() {
            println!("    -");
        }
        for session in &day.sessions {
            println!("    {}", session_line(session));
        }
    }
}

pub fn print_session(session: &Worksession) {
    println!("  ID:         {}", session.id);
    println!("  Title:      {}", session.title);
    println!("  Start:      {}", session.time_range.start().format("%Y-%m-%d %H:%M"));
    println!("  End:        {}", session.time_range.end().format("%Y-%m-%d %H:%M"));
    println!("  Task:       {}", session.subject_id);
    println!("  Owner:      {}", session.collaborator_id);
}

fn session_line(session: &Worksession) -> String {
    format!(
        "{}-{}  {}  [{}]",
        session.time_range.start().format("%H:%M"),
        session.time_range.end().format("%H:%M"),
        session.title,
        session.id
    )
}

fn checkbox(status: Status) -> &'static str {
    match status {
        Status::Done => "[x]",
        Status::Expired => "[!]",
        _ => "[ ]",
    }
}

fn kind_name(kind: PeerKind) -> &'static str {
    match kind {
        PeerKind::Friend => "friend",
        PeerKind::Group => "group",
        PeerKind::Person => "person",
    }
}

fn progress_bar(progress: u8) -> String {
    let filled = usize::from(progress.min(100)) / 5;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(20 - filled))
}
