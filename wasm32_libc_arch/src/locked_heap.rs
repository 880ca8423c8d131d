use crate::expand_heap::HeapExpander;
use crate::grower::DefaultGrower;

/// A heap expander behind a spin-lock, for allocators shared between threads.
///
/// This is the caller-side lock: hold the guard for the whole growth request.
pub struct LockedHeap<T = DefaultGrower> {
    spin: spin::Mutex<HeapExpander<T>>,
}

impl LockedHeap<DefaultGrower> {
    pub const fn new() -> Self {
        LockedHeap {
            spin: spin::Mutex::new(HeapExpander::new()),
        }
    }
}

impl<T> LockedHeap<T> {
    pub const fn with_expander(expander: HeapExpander<T>) -> Self {
        LockedHeap {
            spin: spin::Mutex::new(expander),
        }
    }

    pub fn lock(&self) -> spin::MutexGuard<'_, HeapExpander<T>> {
        self.spin.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::LockedHeap;
    use crate::{HeapExpander, PageCount, SimulatedMemory, PAGE_SIZE};
    use std::{sync::Arc, thread};

    #[test]
    fn guarded_growth_never_overlaps() {
        let heap = Arc::new(LockedHeap::with_expander(HeapExpander::with_grower(
            SimulatedMemory::new(PageCount(1), PageCount(1000)),
        )));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let heap = Arc::clone(&heap);
                thread::spawn(move || {
                    (0..50)
                        .map(|_| heap.lock().try_expand(PAGE_SIZE).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut bases: Vec<usize> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .map(|region| region.base)
            .collect();
        bases.sort_unstable();
        bases.dedup();
        assert_eq!(bases.len(), 200);
        assert_eq!(heap.lock().grower().size(), PageCount(201));
    }
}
