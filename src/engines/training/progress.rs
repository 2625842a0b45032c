use crate::types::FitnessRecord;
use std::sync::mpsc::Sender;

/// Epoch-level progress hooks, called from the training driver thread.
pub trait TrainingObserver: Send {
    fn on_epoch_start(&mut self, epoch: usize, population: usize);
    fn on_epoch_complete(&mut self, epoch: usize, best: Option<FitnessRecord>);
    fn on_epoch_abandoned(&mut self, _epoch: usize) {}
}

/// Reports progress through the `log` facade.
pub struct LogObserver;

impl TrainingObserver for LogObserver {
    fn on_epoch_start(&mut self, epoch: usize, population: usize) {
        log::debug!("Epoch {} starting with {} individuals", epoch, population);
    }

    fn on_epoch_complete(&mut self, epoch: usize, best: Option<FitnessRecord>) {
        match best {
            Some(record) => log::info!(
                "Epoch {} complete. Best fitness: {:.6} ({})",
                epoch,
                record.fitness,
                record
            ),
            None => log::info!("Epoch {} complete", epoch),
        }
    }

    fn on_epoch_abandoned(&mut self, epoch: usize) {
        log::warn!("Epoch {} abandoned on shutdown", epoch);
    }
}

// For passing progress to another thread
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMessage {
    EpochStart { epoch: usize, population: usize },
    EpochComplete { epoch: usize, best: Option<FitnessRecord> },
    EpochAbandoned(usize),
}

pub struct ChannelObserver {
    sender: Sender<ProgressMessage>,
}

impl ChannelObserver {
    pub fn new(sender: Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl TrainingObserver for ChannelObserver {
    fn on_epoch_start(&mut self, epoch: usize, population: usize) {
        let _ = self
            .sender
            .send(ProgressMessage::EpochStart { epoch, population });
    }

    fn on_epoch_complete(&mut self, epoch: usize, best: Option<FitnessRecord>) {
        let _ = self
            .sender
            .send(ProgressMessage::EpochComplete { epoch, best });
    }

    fn on_epoch_abandoned(&mut self, epoch: usize) {
        let _ = self.sender.send(ProgressMessage::EpochAbandoned(epoch));
    }
}
