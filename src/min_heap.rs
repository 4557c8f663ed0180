/// Binary min-heap over a `Vec`, smallest element at index 0.
#[derive(Debug, Clone)]
pub struct MinHeap<T> {
    elements: Vec<T>,
}

impl<T> MinHeap<T> {
    pub fn new() -> Self {
        MinHeap { elements: vec![] }
    }

    pub fn heap_size(&self) -> usize {
        self.elements.len()
    }

    fn parent(i: usize) -> usize {
        (i - 1) / 2
    }

    fn left(i: usize) -> usize {
        2 * i + 1
    }

    fn right(i: usize) -> usize {
        2 * i + 2
    }
}

impl<T: Ord> MinHeap<T> {
    pub fn build(source: Vec<T>) -> Self {
        let mut heap = MinHeap { elements: source };
        let n = heap.heap_size();
        for i in (0..n / 2).rev() {
            heap.min_heapify(i);
        }
        heap
    }

    pub fn valid_min_heap(&self) -> bool {
        (1..self.heap_size()).all(|i| self.elements[Self::parent(i)] <= self.elements[i])
    }

    fn min_heapify(&mut self, mut i: usize) {
        let n = self.heap_size();
        loop {
            let l = Self::left(i);
            let r = Self::right(i);
            let mut smallest = i;

            if l < n && self.elements[l] < self.elements[smallest] {
                smallest = l;
            }
            if r < n && self.elements[r] < self.elements[smallest] {
                smallest = r;
            }
            if smallest == i {
                return;
            }
            self.elements.swap(i, smallest);
            i = smallest;
        }
    }

    pub fn insert(&mut self, value: T) {
        self.elements.push(value);
        let mut i = self.heap_size() - 1;
        while i > 0 && self.elements[i] < self.elements[Self::parent(i)] {
            let p = Self::parent(i);
            self.elements.swap(i, p);
            i = p;
        }
        debug_assert!(self.valid_min_heap());
    }

    pub fn extract_min(&mut self) -> Option<T> {
        if self.elements.is_empty() {
            return None;
        }
        let last = self.heap_size() - 1;
        self.elements.swap(0, last);
        let result = self.elements.pop();
        self.min_heapify(0);
        result
    }
}

impl<T> Default for MinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}
