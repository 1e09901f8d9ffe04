use chrono::{Days, Local, NaiveDate};
use calstrip::{
    app::AppState,
    calendar::{date_math::{midnight_ms, MINUTE_MS}, AccountId, CalEvent, RsvpStatus},
};

fn timed(account: AccountId, id: &str, title: &str, date: NaiveDate, start: (i64, i64), end: (i64, i64)) -> CalEvent {
    let midnight = midnight_ms(&Local, date);
    CalEvent {
        id: CalEvent::composite_id(account, id),
        account_id: account,
        title: title.to_string(),
        all_day: false,
        start_ts: midnight + (start.0 * 60 + start.1) * MINUTE_MS,
        end_ts: midnight + (end.0 * 60 + end.1) * MINUTE_MS,
        is_time_span: false,
        rsvp_status: None,
        color: CalEvent::resolve_color(account, false),
    }
}

fn all_day(account: AccountId, id: &str, title: &str, start: NaiveDate, days: u64) -> Option<CalEvent> {
    let end = start.checked_add_days(Days::new(days))?;
    let is_time_span = days >= 2;
    Some(CalEvent {
        id: CalEvent::composite_id(account, id),
        account_id: account,
        title: title.to_string(),
        all_day: true,
        start_ts: midnight_ms(&Local, start),
        end_ts: midnight_ms(&Local, end),
        is_time_span,
        rsvp_status: None,
        color: CalEvent::resolve_color(account, is_time_span),
    })
}

pub fn add_sample_events(app: &mut AppState) {
    let today = app.today();

    let Some(tomorrow) = today.succ_opt() else { return };
    let Some(yesterday) = today.pred_opt() else { return };
    let Some(last_week) = today.checked_sub_days(Days::new(6)) else { return };
    let Some(next_week) = today.checked_add_days(Days::new(5)) else { return };

    let mut declined = timed(AccountId::Work, "sample_declined", "Optional All-Hands", today, (16, 0), (17, 0));
    declined.rsvp_status = Some(RsvpStatus::Declined);

    let mut work = vec![
        timed(AccountId::Work, "sample_0", "Morning Standup", today, (9, 0), (9, 30)),
        timed(AccountId::Work, "sample_1", "Team Sync", today, (14, 0), (15, 0)),
        timed(AccountId::Work, "sample_2", "Code Review", tomorrow, (10, 0), (11, 0)),
        timed(AccountId::Work, "sample_3", "Sprint Planning", tomorrow, (15, 0), (16, 30)),
        timed(AccountId::Work, "sample_4", "Release Retro", yesterday, (6, 30), (8, 0)),
        timed(AccountId::Work, "sample_5", "Late Deploy", yesterday, (21, 30), (23, 0)),
        declined,
    ];
    work.extend(all_day(AccountId::Work, "sample_conf", "Conference", next_week, 3));

    let mut private = vec![
        timed(AccountId::Private, "sample_0", "Gym", today, (7, 0), (8, 0)),
        timed(AccountId::Private, "sample_1", "Lunch with Sam", yesterday, (12, 30), (13, 30)),
        timed(AccountId::Private, "sample_2", "Dentist", tomorrow, (8, 15), (8, 45)),
    ];
    private.extend(all_day(AccountId::Private, "sample_trip", "Family Trip", last_week, 4));
    private.extend(all_day(AccountId::Private, "sample_visit", "Parents Visiting", last_week.succ_opt().unwrap_or(last_week), 5));
    private.extend(all_day(AccountId::Private, "sample_bday", "Birthday", tomorrow, 1));

    app.set_account_events(AccountId::Work, work);
    app.set_account_events(AccountId::Private, private);
}
