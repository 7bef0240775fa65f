//! Incremental tracking of autoclosed pairs.
//!
//! The [`Tracker`] keeps one [`Cluster`] per cursor. Clusters live in their
//! own array, index-parallel to a sorted copy of the host's cursors; host
//! cursor objects have no stable identity, so nothing is attached to them.
//!
//! ```text
//! cursors (sorted):  [ c0      c1              c2 ]
//! clusters:          [ []      [(..), [..]]    [{..}] ]
//!                              outer  inner
//! ```
//!
//! Two events drive it:
//!
//! - **Selection changes** re-associate clusters with the new cursors and
//!   untrack every pair a cursor has left.
//! - **Content changes** shift every tracked position through the edit batch
//!   in a single top-to-bottom pass (see [`DeltaStack`]), drop pairs that were
//!   overwritten or split across lines, and pick up freshly autoclosed pairs.
//!
//! Decorations are never touched from inside the syncs. They are marked
//! stale and brought up to date by [`Tracker::sync_decorations`], which the
//! session calls once at the end of a turn.

use std::{
  mem,
  rc::Rc,
};

use the_core::chars::{
  str_is_blank,
  utf16_len,
};

use crate::{
  change::ContentChangeEvent,
  config::Configuration,
  decoration::{
    Decoration,
    DecorationRenderer,
  },
  delta::DeltaStack,
  pair::{
    Cluster,
    Pair,
    PairSnapshot,
  },
  position::{
    Position,
    Range,
  },
  selection::{
    Selection,
    SortedCursor,
    sort_cursors,
  },
  text::TextSource,
};

pub struct Tracker {
  sorted_cursors:     Vec<SortedCursor>,
  /// Parallel to `sorted_cursors`.
  clusters:           Vec<Cluster>,
  /// Decorations of untracked pairs, disposed on the next decoration sync.
  pending_undecorate: Vec<Decoration>,
  decorations_stale:  bool,
  pair_count:         usize,
  config:             Configuration,
  renderer:           Rc<dyn DecorationRenderer>,
}

/// A tracked position visited during a content sync.
///
/// Detection sorts first among probes at the same position: an insertion at
/// a cursor must still be on the stack when the cursor is examined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ProbeKind {
  Detect,
  Open,
  Close,
}

#[derive(Debug, Clone, Copy)]
struct Probe {
  at:      Position,
  kind:    ProbeKind,
  cluster: usize,
  pair:    usize,
}

fn retire(pending: &mut Vec<Decoration>, pair: Pair) {
  if let Some(decoration) = pair.decoration {
    pending.push(decoration);
  }
}

impl Tracker {
  pub fn new(
    selections: &[Selection],
    config: Configuration,
    renderer: Rc<dyn DecorationRenderer>,
  ) -> Self {
    let sorted_cursors = sort_cursors(selections);
    let clusters = sorted_cursors.iter().map(|_| Cluster::new()).collect();
    Self {
      sorted_cursors,
      clusters,
      pending_undecorate: Vec::new(),
      decorations_stale: false,
      pair_count: 0,
      config,
      renderer,
    }
  }

  pub fn configuration(&self) -> &Configuration {
    &self.config
  }

  pub fn sorted_cursors(&self) -> &[SortedCursor] {
    &self.sorted_cursors
  }

  pub fn pair_count(&self) -> usize {
    self.pair_count
  }

  pub fn has_pairs(&self) -> bool {
    self.pair_count > 0
  }

  pub fn decorations_stale(&self) -> bool {
    self.decorations_stale
  }

  /// Number of decorations waiting to be disposed.
  pub fn pending_undecorate(&self) -> usize {
    self.pending_undecorate.len()
  }

  /// Re-associate clusters with `selections` and untrack every pair whose
  /// cursor has left it.
  ///
  /// When the cursor count changed, cursors are assumed to have been only
  /// added or removed: surviving cursors are matched to their old selves by
  /// equal anchors. Clusters of removed cursors are dropped; added cursors
  /// start with an empty cluster.
  pub fn sync_to_selection_changes(&mut self, selections: &[Selection]) {
    tracing::trace!(cursors = selections.len(), "sync to selection changes");

    let new_cursors = sort_cursors(selections);
    let mut untracked = 0;

    if new_cursors.len() != self.sorted_cursors.len() {
      let old_clusters = mem::take(&mut self.clusters);
      let mut old = self.sorted_cursors.iter().zip(old_clusters).peekable();
      let mut clusters = Vec::with_capacity(new_cursors.len());

      for cursor in &new_cursors {
        let anchor = cursor.anchor();
        while let Some((_, removed)) = old.next_if(|(old_cursor, _)| old_cursor.anchor() < anchor) {
          for pair in removed {
            retire(&mut self.pending_undecorate, pair);
            untracked += 1;
          }
        }
        match old.next_if(|(old_cursor, _)| old_cursor.anchor() == anchor) {
          Some((_, kept)) => clusters.push(kept),
          None => clusters.push(Cluster::new()),
        }
      }
      for (_, removed) in old {
        for pair in removed {
          retire(&mut self.pending_undecorate, pair);
          untracked += 1;
        }
      }

      self.clusters = clusters;
    }

    self.sorted_cursors = new_cursors;

    for (cursor, cluster) in self.sorted_cursors.iter().zip(&mut self.clusters) {
      let anchor = cursor.anchor();
      // Pairs are nested, so the first enclosing pair from the inside means
      // every outer one encloses too.
      while cluster.last().is_some_and(|pair| !pair.encloses(anchor)) {
        if let Some(pair) = cluster.pop() {
          retire(&mut self.pending_undecorate, pair);
          untracked += 1;
        }
      }
    }

    if untracked > 0 {
      tracing::debug!(untracked, "cursor left tracked pairs");
      self.pair_count -= untracked;
      self.decorations_stale = true;
    }
  }

  /// Carry every tracked pair through a batch of content changes and track
  /// pairs the host just autoclosed.
  ///
  /// A change is taken as an autoclose when it inserts, without replacing
  /// anything, exactly one of the configured two-character pairs at an empty
  /// cursor. A paste of the same two characters looks identical and gets
  /// tracked too; the cursor lands after the pasted text, so the next
  /// selection sync untracks it again.
  pub fn sync_to_content_changes(&mut self, event: &ContentChangeEvent) {
    tracing::trace!(
      changes = event.changes.len(),
      pairs = self.pair_count,
      "sync to content changes"
    );
    if event.changes.is_empty() {
      return;
    }

    let mut offsets = Vec::with_capacity(self.clusters.len());
    let mut probes = Vec::with_capacity(self.pair_count * 2 + self.clusters.len());
    let mut total = 0;
    for (c, (cursor, cluster)) in self.sorted_cursors.iter().zip(&self.clusters).enumerate() {
      offsets.push(total);
      total += cluster.len();
      if cursor.selection.is_empty() {
        probes.push(Probe {
          at:      cursor.anchor(),
          kind:    ProbeKind::Detect,
          cluster: c,
          pair:    0,
        });
      }
      for (i, pair) in cluster.iter().enumerate() {
        probes.push(Probe {
          at:      pair.open,
          kind:    ProbeKind::Open,
          cluster: c,
          pair:    i,
        });
        probes.push(Probe {
          at:      pair.close,
          kind:    ProbeKind::Close,
          cluster: c,
          pair:    i,
        });
      }
    }
    // Sorting by position keeps the stack pass single and forward even when
    // one cursor sits inside another cursor's pairs. Without interleaving this
    // is exactly: opens outer to inner, the cursor, closes inner to outer.
    probes.sort_unstable_by_key(|probe| (probe.at, probe.kind));

    let mut stack = DeltaStack::new(&event.changes);
    let mut shifted: Vec<(Option<Position>, Option<Position>)> = vec![(None, None); total];
    let mut detected: Vec<Option<Position>> = vec![None; self.clusters.len()];

    for probe in &probes {
      match probe.kind {
        ProbeKind::Detect => {
          stack.advance_to(probe.at);
          let autoclosed = stack.peek().is_some_and(|change| {
            change.is_insertion()
              && change.range.start == probe.at
              && utf16_len(&change.text) == 2
              && self.config.is_detected(&change.text)
          });
          if autoclosed {
            detected[probe.cluster] = Some(stack.translate(probe.at));
          }
        },
        ProbeKind::Open => {
          shifted[offsets[probe.cluster] + probe.pair].0 = stack.shift(probe.at);
        },
        ProbeKind::Close => {
          shifted[offsets[probe.cluster] + probe.pair].1 = stack.shift(probe.at);
        },
      }
    }

    let mut untracked = 0;
    let mut tracked = 0;
    for (c, cluster) in self.clusters.iter_mut().enumerate() {
      let base = offsets[c];
      for (i, mut pair) in mem::take(cluster).into_iter().enumerate() {
        match shifted[base + i] {
          (Some(open), Some(close)) if open.line == close.line => {
            pair.open = open;
            pair.close = close;
            cluster.push(pair);
          },
          _ => {
            retire(&mut self.pending_undecorate, pair);
            untracked += 1;
          },
        }
      }

      // Typed at the cursor, which every remaining pair encloses, so the new
      // pair is the innermost.
      if let Some(open) = detected[c] {
        tracing::debug!(line = open.line, character = open.character, "tracking autoclosed pair");
        cluster.push(Pair::new(open, open.translate(0, 1)));
        tracked += 1;
      }
    }

    if untracked > 0 || tracked > 0 {
      tracing::debug!(tracked, untracked, "pairs changed by content change");
      self.pair_count = self.pair_count + tracked - untracked;
      self.decorations_stale = true;
    }
  }

  /// The innermost pair of each cursor, in the host's cursor order.
  pub fn innermost_pairs(&self) -> Vec<Option<&Pair>> {
    let mut innermost = vec![None; self.sorted_cursors.len()];
    for (cursor, cluster) in self.sorted_cursors.iter().zip(&self.clusters) {
      innermost[cursor.unsorted_index] = cluster.last();
    }
    innermost
  }

  /// True when at least one pair is tracked and every cursor that has a
  /// pair is an empty selection with only whitespace between it and the
  /// closing side of its innermost pair.
  ///
  /// Cursors without pairs do not block.
  pub fn has_line_of_sight<T: TextSource + ?Sized>(&self, text: &T) -> bool {
    self.has_pairs()
      && self
        .sorted_cursors
        .iter()
        .zip(&self.clusters)
        .all(|(cursor, cluster)| {
          let Some(pair) = cluster.last() else {
            return true;
          };
          cursor.selection.is_empty()
            && text
              .text_in(Range::new(cursor.anchor(), pair.close))
              .is_some_and(|between| str_is_blank(&between))
        })
  }

  /// Bring decorations in line with the tracked pairs, if anything changed
  /// since the last call.
  pub fn sync_decorations(&mut self) {
    if !self.decorations_stale {
      return;
    }

    let decorate_all = self.config.decorate_all();
    let style = self.config.decoration();
    for cluster in &mut self.clusters {
      let innermost = cluster.len().saturating_sub(1);
      for (i, pair) in cluster.iter_mut().enumerate() {
        if decorate_all || i == innermost {
          if pair.decoration.is_none() {
            pair.decoration = Some(Decoration::apply(&self.renderer, style, pair.close_range()));
          }
        } else {
          pair.decoration = None;
        }
      }
    }

    self.pending_undecorate.clear();
    self.decorations_stale = false;
  }

  /// Stop tracking every pair.
  pub fn untrack_pairs(&mut self) {
    for cluster in &mut self.clusters {
      for pair in cluster.drain(..) {
        retire(&mut self.pending_undecorate, pair);
      }
    }
    if self.pair_count > 0 {
      tracing::debug!(untracked = self.pair_count, "untracking all pairs");
    }
    self.pair_count = 0;
    self.decorations_stale = true;
  }

  /// Swap the configuration. Tracked pairs are not carried over.
  pub fn change_configuration(&mut self, config: Configuration) {
    self.untrack_pairs();
    self.config = config;
  }

  /// Untrack everything and remove all decorations right away.
  pub fn dispose(&mut self) {
    self.untrack_pairs();
    self.sync_decorations();
  }

  /// A copy of every cluster, in the host's cursor order.
  pub fn snapshot(&self) -> Vec<Vec<PairSnapshot>> {
    let mut snapshot = vec![Vec::new(); self.sorted_cursors.len()];
    for (cursor, cluster) in self.sorted_cursors.iter().zip(&self.clusters) {
      snapshot[cursor.unsorted_index] = cluster.iter().map(Pair::snapshot).collect();
    }
    snapshot
  }
}

impl std::fmt::Debug for Tracker {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Tracker")
      .field("sorted_cursors", &self.sorted_cursors)
      .field("clusters", &self.clusters)
      .field("pending_undecorate", &self.pending_undecorate)
      .field("decorations_stale", &self.decorations_stale)
      .field("pair_count", &self.pair_count)
      .field("config", &self.config)
      .finish_non_exhaustive()
  }
}
