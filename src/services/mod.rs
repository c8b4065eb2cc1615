pub mod booking;
pub mod booking_flow;
pub mod conflict;
pub mod time_slots;

#[cfg(test)]
mod booking_flow_test;
#[cfg(test)]
mod booking_test;
