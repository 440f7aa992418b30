/// Tag carried by an asynchronous load so its completion can be matched
/// against the request that is still wanted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    list_id: Option<String>,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The list being watched when the load was issued
    pub fn list_id(&self) -> Option<&str> {
        self.list_id.as_deref()
    }
}

/// Issues load tickets and decides which completions may be applied.
///
/// Only the most recently issued ticket is accepted, and only while the
/// view is mounted and still watching the same list.
#[derive(Debug, Clone, Default)]
pub struct LoadTracker {
    generation: u64,
    pending: Option<u64>,
    watched_list: Option<String>,
}

impl LoadTracker {
    pub fn issue(&mut self) -> LoadTicket {
        self.generation += 1;
        self.pending = Some(self.generation);
        LoadTicket {
            generation: self.generation,
            list_id: self.watched_list.clone(),
        }
    }

    /// Switch the watched list. Outstanding loads for the old list go stale.
    pub fn watch(&mut self, list_id: Option<&str>) {
        if self.watched_list.as_deref() != list_id {
            self.watched_list = list_id.map(str::to_string);
            self.invalidate();
        }
    }

    pub fn watched_list(&self) -> Option<&str> {
        self.watched_list.as_deref()
    }

    /// Make every outstanding ticket stale.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns true if `ticket` is the current request; it is consumed.
    pub fn accept(&mut self, ticket: &LoadTicket) -> bool {
        if self.pending != Some(ticket.generation)
            || ticket.list_id.as_deref() != self.watched_list.as_deref()
        {
            return false;
        }
        self.pending = None;
        true
    }
}
