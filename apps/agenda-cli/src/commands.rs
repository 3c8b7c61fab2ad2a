use std::sync::Arc;

use anyhow::Context;

use appointment_cell::{
    on_day, Appointment, AppointmentService, ReschedulingCoordinator, ReschedulingSession,
};
use doctor_cell::{
    AvailabilityCache, CalendarDay, DayAvailabilityFetcher, DayNotice, DoctorId,
    MonthAvailabilityScanner, Slot, SystemClock, YearMonth,
};
use shared_config::AppConfig;

fn availability_cache(config: &AppConfig) -> Arc<AvailabilityCache> {
    let scanner = MonthAvailabilityScanner::new(
        DayAvailabilityFetcher::from_config(config),
        Arc::new(SystemClock),
    );
    Arc::new(AvailabilityCache::new(scanner))
}

fn parse_month(raw: &str) -> anyhow::Result<YearMonth> {
    raw.parse()
        .with_context(|| format!("'{}' is not a month in yyyy-MM form", raw))
}

fn parse_day(raw: &str) -> anyhow::Result<CalendarDay> {
    raw.parse()
        .with_context(|| format!("'{}' is not a day in yyyy-MM-dd form", raw))
}

fn print_days(month: YearMonth, days: impl IntoIterator<Item = CalendarDay>) {
    let days: Vec<String> = days.into_iter().map(|d| d.to_string()).collect();
    if days.is_empty() {
        println!("{}: no days with open slots", month);
    } else {
        println!("{}: {}", month, days.join(", "));
    }
}

fn print_slots(slots: &[Slot]) {
    for slot in slots {
        let marker = if slot.available { "open" } else { "taken" };
        println!("  {}  {}", slot.time, marker);
    }
}

fn print_notice(notice: &DayNotice) {
    if notice.is_error() {
        eprintln!("{}", notice);
    } else {
        println!("{}", notice);
    }
}

fn print_appointment(appointment: &Appointment) {
    let doctor = appointment
        .doctor
        .name
        .as_deref()
        .unwrap_or(appointment.doctor_id().as_str());
    let patient = appointment
        .dependent
        .as_ref()
        .or(appointment.collaborator.as_ref())
        .and_then(|p| p.name.as_deref())
        .unwrap_or("-");

    println!(
        "{}  {}  {}  {}  {}",
        appointment.id, appointment.scheduled_time, doctor, patient, appointment.status
    );
}

pub async fn month(config: &AppConfig, doctor_id: &str, month: &str) -> anyhow::Result<()> {
    let month = parse_month(month)?;
    let cache = availability_cache(config);

    let days = cache.get_or_scan(&DoctorId::from(doctor_id), month).await;
    print_days(month, days);
    Ok(())
}

pub async fn day(config: &AppConfig, doctor_id: &str, day: &str) -> anyhow::Result<()> {
    let day = parse_day(day)?;
    let fetcher = DayAvailabilityFetcher::from_config(config);

    let result = fetcher.fetch(&DoctorId::from(doctor_id), day).await;
    println!("{}", day);
    print_slots(result.slots());
    if let Some(notice) = result.notice() {
        print_notice(&notice);
    }
    Ok(())
}

pub async fn list(config: &AppConfig, day: Option<&str>) -> anyhow::Result<()> {
    let mut appointments = AppointmentService::from_config(config)
        .list_scheduled()
        .await
        .context("could not load appointments")?;

    if let Some(day) = day {
        appointments = on_day(&appointments, parse_day(day)?);
    }

    if appointments.is_empty() {
        println!("No scheduled appointments.");
    }
    for appointment in &appointments {
        print_appointment(appointment);
    }
    Ok(())
}

pub async fn reschedule(
    config: &AppConfig,
    appointment_id: &str,
    month: Option<&str>,
    day: Option<&str>,
    slot: Option<&str>,
) -> anyhow::Result<()> {
    let appointment = AppointmentService::from_config(config)
        .find_scheduled(appointment_id)
        .await?;

    let cache = availability_cache(config);
    let coordinator = Arc::new(ReschedulingCoordinator::from_config(config).with_cache(Arc::clone(&cache)));

    let mut session = ReschedulingSession::open(cache, coordinator, appointment)
        .await
        .context("could not open the appointment for rescheduling")?;

    if let Some(month) = month {
        if let Some(notice) = session.change_month(parse_month(month)?).await {
            print_notice(&notice);
        }
    }
    if let Some(day) = day {
        if let Some(notice) = session.select_day(parse_day(day)?).await {
            print_notice(&notice);
        }
    }

    print_appointment(session.appointment());
    print_days(session.month(), session.available_days().iter().copied());

    let Some(slot) = slot else {
        match session.selected_day() {
            Some(day) => {
                println!("{}", day);
                print_slots(session.slots());
            }
            None => println!("No day selected."),
        }
        return Ok(());
    };

    session.choose_slot(slot)?;
    let updated = session.confirm().await?;
    println!("Rescheduled:");
    print_appointment(updated);
    Ok(())
}

pub async fn cancel(config: &AppConfig, appointment_id: &str) -> anyhow::Result<()> {
    let appointment = AppointmentService::from_config(config)
        .find_scheduled(appointment_id)
        .await?;

    let updated = ReschedulingCoordinator::from_config(config)
        .cancel(&appointment)
        .await?;
    print_appointment(&updated);
    Ok(())
}

pub async fn no_show(config: &AppConfig, appointment_id: &str) -> anyhow::Result<()> {
    let appointment = AppointmentService::from_config(config)
        .find_scheduled(appointment_id)
        .await?;

    let updated = ReschedulingCoordinator::from_config(config)
        .mark_no_show(&appointment)
        .await?;
    print_appointment(&updated);
    Ok(())
}
