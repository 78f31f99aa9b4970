use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{EventHandler, EventProducer, Handler, ReceiptReadyEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub receipt_ready_producer: Vec<EventProducer<ReceiptReadyEvent>>,
}

pub struct EventHandlers {
    pub on_receipt_ready: Option<EventHandler<ReceiptReadyEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_receipt_ready = hooks.on_receipt_ready.map(|f| EventHandler::new(buffer_size, f));
        Self { on_receipt_ready }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_receipt_ready {
            result.receipt_ready_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_receipt_ready {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_receipt_ready: Option<Handler<ReceiptReadyEvent>>,
}

impl EventHooks {
    pub fn on_receipt_ready<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(ReceiptReadyEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_receipt_ready = Some(Arc::new(f));
        self
    }
}
