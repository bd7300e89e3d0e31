use crate::{
    error::{AppError, Result},
    models::{
        booking::{Booking, BookingPatch, BookingStatus, NewBooking},
        client::{Client, NewClient},
    },
    services::notifier::{deliver_email, dispatch_sms},
    state::AppState,
};

/// Stores a new inquiry and tells both sides about it.
///
/// The client and booking rows are written as one unit. Notifications go
/// out only after that write succeeds, and their failures are logged, never
/// returned.
///
/// # Returns
///
/// A `Result` containing the created client and its pending booking.
pub async fn submit_inquiry(
    state: &AppState,
    client: NewClient,
    booking: NewBooking,
) -> Result<(Client, Booking)> {
    let (client, booking) = state.store.create_inquiry(client, booking).await?;
    tracing::info!(
        "📝 Inquiry stored: client {} booking {} ({} on {})",
        client.id,
        booking.id,
        booking.event_type,
        booking.event_date
    );

    let sms_to = state
        .config
        .notifier
        .business_phone
        .clone()
        .unwrap_or_else(|| client.phone.clone());
    dispatch_sms(
        state.notifier.clone(),
        sms_to,
        format!(
            "New inquiry from {} for {} ({}) on {} at {}. Reply to {}.",
            client.name,
            booking.event_name,
            booking.event_type,
            booking.event_date,
            booking.event_time,
            client.phone
        ),
    );

    deliver_email(
        state.notifier.as_ref(),
        &client.email,
        "We received your booking inquiry",
        &format!(
            "Hi {},\n\nThanks for your inquiry about {} on {} at {}. \
             We will review it and get back to you shortly.",
            client.name, booking.event_name, booking.event_date, booking.event_time
        ),
    )
    .await;

    Ok((client, booking))
}

/// Sets the status of a client's booking and notifies the client.
///
/// Only the status column changes.
///
/// # Errors
///
/// `AppError::NotFound` if the client or its booking does not exist.
pub async fn set_inquiry_status(state: &AppState, client_id: i64, status: BookingStatus) -> Result<Booking> {
    let client = state
        .store
        .find_client(client_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let booking = state
        .store
        .find_booking_by_client(client.id)
        .await?
        .ok_or(AppError::NotFound)?;

    let booking = state
        .store
        .update_booking(booking.id, BookingPatch::status_only(status))
        .await?
        .ok_or(AppError::NotFound)?;

    tracing::info!("✅ Booking {} for client {} is now {}", booking.id, client.id, status);

    let (subject, message) = match status {
        BookingStatus::Approved => (
            "Your booking is confirmed",
            format!(
                "Hi {}, great news: your booking for {} on {} at {} is confirmed.",
                client.name, booking.event_name, booking.event_date, booking.event_time
            ),
        ),
        BookingStatus::Declined => (
            "Update on your booking inquiry",
            format!(
                "Hi {}, unfortunately we are unable to take your booking for {} on {}.",
                client.name, booking.event_name, booking.event_date
            ),
        ),
        BookingStatus::Pending => (
            "Your booking inquiry is under review",
            format!(
                "Hi {}, your inquiry for {} on {} is back under review.",
                client.name, booking.event_name, booking.event_date
            ),
        ),
    };

    dispatch_sms(state.notifier.clone(), client.phone.clone(), message.clone());
    deliver_email(state.notifier.as_ref(), &client.email, subject, &message).await;

    Ok(booking)
}
