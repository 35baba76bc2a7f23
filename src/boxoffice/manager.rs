//! Multi-festival management with centralized sale event routing.
//!
//! This module provides festival management through a trait-based design,
//! with implementations for both standard library (`FestivalManagerStd`) and
//! Tokio (`FestivalManagerTokio`) channels. Every managed engine's completed
//! sales are routed into one channel for downstream processing (receipts,
//! fulfilment, analytics).

use super::engine::BoxOffice;
use super::sale::{SaleEvent, SaleListener, SaleResult};
use crate::utils::current_time_millis;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Trait for managing multiple festival engines with centralized sale
/// event routing.
///
/// Implementations differ only in the channel type carrying the events
/// (std::mpsc, tokio::mpsc).
pub trait FestivalManager {
    /// Adds an engine for a festival, wiring its sale listener into the
    /// manager's event channel.
    fn add_festival(&mut self, festival_id: Uuid, name: &str, starts_at: u64, qr_secret: &[u8]);

    /// Gets a reference to a festival's engine.
    fn get_festival(&self, festival_id: &Uuid) -> Option<&BoxOffice>;

    /// Gets a mutable reference to a festival's engine.
    fn get_festival_mut(&mut self, festival_id: &Uuid) -> Option<&mut BoxOffice>;

    /// Ids of all managed festivals.
    fn festival_ids(&self) -> Vec<Uuid>;

    /// Removes a festival's engine, returning it.
    fn remove_festival(&mut self, festival_id: &Uuid) -> Option<BoxOffice>;

    /// Whether an engine exists for this festival.
    fn has_festival(&self, festival_id: &Uuid) -> bool;

    /// Number of managed festivals.
    fn festival_count(&self) -> usize;
}

fn sale_event_from(sale: &SaleResult) -> SaleEvent {
    SaleEvent {
        festival_id: sale.festival_id,
        sale: sale.clone(),
        timestamp: current_time_millis(),
    }
}

fn log_sale_event(event: &SaleEvent) {
    info!(
        "Processing sale for festival {}: {} tickets, total {}",
        event.festival_id,
        event.sale.ticket_count(),
        event.sale.pricing.total
    );
}

/// FestivalManager implementation using standard library mpsc channels.
pub struct FestivalManagerStd {
    /// Engines indexed by festival id.
    festivals: HashMap<Uuid, BoxOffice>,
    /// Sender for sale events.
    sale_sender: std::sync::mpsc::Sender<SaleEvent>,
    /// Receiver for sale events (taken when the processor starts).
    sale_receiver: Option<std::sync::mpsc::Receiver<SaleEvent>>,
}

impl FestivalManagerStd {
    /// Creates a manager with a standard library mpsc channel.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = std::sync::mpsc::channel();

        Self {
            festivals: HashMap::new(),
            sale_sender: sender,
            sale_receiver: Some(receiver),
        }
    }

    /// Starts the sale event processor in a separate thread.
    pub fn start_sale_processor(&mut self) -> std::thread::JoinHandle<()> {
        let receiver = self
            .sale_receiver
            .take()
            .expect("Sale processor already started");

        std::thread::spawn(move || {
            info!("Sale processor started");

            while let Ok(event) = receiver.recv() {
                log_sale_event(&event);
            }

            info!("Sale processor stopped");
        })
    }

    /// Takes the event receiver for custom processing instead of
    /// [`Self::start_sale_processor`].
    pub fn take_receiver(&mut self) -> Option<std::sync::mpsc::Receiver<SaleEvent>> {
        self.sale_receiver.take()
    }

    /// A purchaser's tickets across all managed festivals, optionally
    /// filtered to one festival.
    #[must_use]
    pub fn tickets_for_owner(
        &self,
        owner: super::ticket::OwnerId,
        festival_id: Option<Uuid>,
    ) -> Vec<super::ticket::TicketSnapshot> {
        self.festivals
            .values()
            .filter(|engine| festival_id.is_none_or(|id| engine.festival_id() == id))
            .flat_map(|engine| engine.tickets_for_owner(owner))
            .collect()
    }
}

impl FestivalManager for FestivalManagerStd {
    fn add_festival(&mut self, festival_id: Uuid, name: &str, starts_at: u64, qr_secret: &[u8]) {
        let sender = self.sale_sender.clone();

        let listener: SaleListener = Arc::new(move |sale: &SaleResult| {
            if let Err(e) = sender.send(sale_event_from(sale)) {
                error!("Failed to send sale event for {}: {}", sale.festival_id, e);
            }
        });

        let engine = BoxOffice::with_sale_listener(festival_id, name, starts_at, qr_secret, listener);
        self.festivals.insert(festival_id, engine);
        info!("Added box office for festival: {}", festival_id);
    }

    fn get_festival(&self, festival_id: &Uuid) -> Option<&BoxOffice> {
        self.festivals.get(festival_id)
    }

    fn get_festival_mut(&mut self, festival_id: &Uuid) -> Option<&mut BoxOffice> {
        self.festivals.get_mut(festival_id)
    }

    fn festival_ids(&self) -> Vec<Uuid> {
        self.festivals.keys().copied().collect()
    }

    fn remove_festival(&mut self, festival_id: &Uuid) -> Option<BoxOffice> {
        let result = self.festivals.remove(festival_id);
        if result.is_some() {
            info!("Removed box office for festival: {}", festival_id);
        }
        result
    }

    fn has_festival(&self, festival_id: &Uuid) -> bool {
        self.festivals.contains_key(festival_id)
    }

    fn festival_count(&self) -> usize {
        self.festivals.len()
    }
}

impl Default for FestivalManagerStd {
    fn default() -> Self {
        Self::new()
    }
}

/// FestivalManager implementation using Tokio mpsc channels.
pub struct FestivalManagerTokio {
    /// Engines indexed by festival id.
    festivals: HashMap<Uuid, BoxOffice>,
    /// Sender for sale events.
    sale_sender: tokio::sync::mpsc::UnboundedSender<SaleEvent>,
    /// Receiver for sale events (taken when the processor starts).
    sale_receiver: Option<tokio::sync::mpsc::UnboundedReceiver<SaleEvent>>,
}

impl FestivalManagerTokio {
    /// Creates a manager with a Tokio unbounded mpsc channel.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();

        Self {
            festivals: HashMap::new(),
            sale_sender: sender,
            sale_receiver: Some(receiver),
        }
    }

    /// Starts the sale event processor as an async task.
    ///
    /// Returns a JoinHandle for the spawned task.
    pub fn start_sale_processor(&mut self) -> tokio::task::JoinHandle<()> {
        let mut receiver = self
            .sale_receiver
            .take()
            .expect("Sale processor already started");

        tokio::spawn(async move {
            info!("Sale processor started (Tokio)");

            while let Some(event) = receiver.recv().await {
                log_sale_event(&event);
            }

            info!("Sale processor stopped (Tokio)");
        })
    }

    /// Takes the event receiver for custom processing instead of
    /// [`Self::start_sale_processor`].
    pub fn take_receiver(&mut self) -> Option<tokio::sync::mpsc::UnboundedReceiver<SaleEvent>> {
        self.sale_receiver.take()
    }

    /// A purchaser's tickets across all managed festivals, optionally
    /// filtered to one festival.
    #[must_use]
    pub fn tickets_for_owner(
        &self,
        owner: super::ticket::OwnerId,
        festival_id: Option<Uuid>,
    ) -> Vec<super::ticket::TicketSnapshot> {
        self.festivals
            .values()
            .filter(|engine| festival_id.is_none_or(|id| engine.festival_id() == id))
            .flat_map(|engine| engine.tickets_for_owner(owner))
            .collect()
    }
}

impl FestivalManager for FestivalManagerTokio {
    fn add_festival(&mut self, festival_id: Uuid, name: &str, starts_at: u64, qr_secret: &[u8]) {
        let sender = self.sale_sender.clone();

        let listener: SaleListener = Arc::new(move |sale: &SaleResult| {
            if let Err(e) = sender.send(sale_event_from(sale)) {
                error!("Failed to send sale event for {}: {}", sale.festival_id, e);
            }
        });

        let engine = BoxOffice::with_sale_listener(festival_id, name, starts_at, qr_secret, listener);
        self.festivals.insert(festival_id, engine);
        info!("Added box office for festival: {}", festival_id);
    }

    fn get_festival(&self, festival_id: &Uuid) -> Option<&BoxOffice> {
        self.festivals.get(festival_id)
    }

    fn get_festival_mut(&mut self, festival_id: &Uuid) -> Option<&mut BoxOffice> {
        self.festivals.get_mut(festival_id)
    }

    fn festival_ids(&self) -> Vec<Uuid> {
        self.festivals.keys().copied().collect()
    }

    fn remove_festival(&mut self, festival_id: &Uuid) -> Option<BoxOffice> {
        let result = self.festivals.remove(festival_id);
        if result.is_some() {
            info!("Removed box office for festival: {}", festival_id);
        }
        result
    }

    fn has_festival(&self, festival_id: &Uuid) -> bool {
        self.festivals.contains_key(festival_id)
    }

    fn festival_count(&self) -> usize {
        self.festivals.len()
    }
}

impl Default for FestivalManagerTokio {
    fn default() -> Self {
        Self::new()
    }
}
