use std::fmt;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::{Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use tracing::debug;

use shared_client::{BackendClient, ClientError};
use shared_config::AppConfig;

use crate::models::{CalendarDay, DoctorId, Slot};

/// Remote source of per-day slot lists. The remote system alone decides what
/// a slot is and whether it is free.
#[async_trait]
pub trait SlotDirectory: Send + Sync {
    async fn get_day_availability(
        &self,
        doctor_id: &DoctorId,
        day: CalendarDay,
    ) -> Result<Vec<Slot>, ClientError>;
}

pub struct HttpSlotDirectory {
    client: BackendClient,
}

impl HttpSlotDirectory {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: BackendClient::new(config),
        }
    }
}

#[async_trait]
impl SlotDirectory for HttpSlotDirectory {
    async fn get_day_availability(
        &self,
        doctor_id: &DoctorId,
        day: CalendarDay,
    ) -> Result<Vec<Slot>, ClientError> {
        debug!("Fetching slots for doctor {} on {}", doctor_id, day);

        let path = format!("/medico/{}/disponibilidade", doctor_id);
        let day = day.iso();

        let slots: Option<SlotList> = self.client.request(
            Method::GET,
            &path,
            &[("dia", day.as_str())],
            None,
        ).await?;

        Ok(slots.map(|list| list.0).unwrap_or_default())
    }
}

/// Slot list as found in `data`. Anything other than an array reads as a day
/// without slots; a malformed entry inside an array is still a decode error.
struct SlotList(Vec<Slot>);

impl<'de> Deserialize<'de> for SlotList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(SlotListVisitor)
    }
}

struct SlotListVisitor;

impl<'de> Visitor<'de> for SlotListVisitor {
    type Value = SlotList;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a list of slots")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<SlotList, A::Error> {
        let mut slots = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(slot) = seq.next_element::<Slot>()? {
            slots.push(slot);
        }
        Ok(SlotList(slots))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<SlotList, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(SlotList(Vec::new()))
    }

    fn visit_bool<E>(self, _: bool) -> Result<SlotList, E> {
        Ok(SlotList(Vec::new()))
    }

    fn visit_i64<E>(self, _: i64) -> Result<SlotList, E> {
        Ok(SlotList(Vec::new()))
    }

    fn visit_u64<E>(self, _: u64) -> Result<SlotList, E> {
        Ok(SlotList(Vec::new()))
    }

    fn visit_f64<E>(self, _: f64) -> Result<SlotList, E> {
        Ok(SlotList(Vec::new()))
    }

    fn visit_str<E>(self, _: &str) -> Result<SlotList, E> {
        Ok(SlotList(Vec::new()))
    }

    fn visit_unit<E>(self) -> Result<SlotList, E> {
        Ok(SlotList(Vec::new()))
    }
}
