#![no_main]

use std::cell::RefCell;
use std::rc::Rc;

use libfuzzer_sys::fuzz_target;
use packbuf::SinkBuffer;

fuzz_target!(|input: (u8, Vec<u8>, Vec<u8>)| {
    let (capacity, splits, data) = input;

    let out = Rc::new(RefCell::new(Vec::new()));
    let sink_out = out.clone();
    let mut sink = SinkBuffer::new(capacity as usize, move |chunk: &[u8]| -> std::io::Result<()> {
        sink_out.borrow_mut().extend_from_slice(chunk);
        Ok(())
    });

    // Split the input at fuzzer-chosen lengths
    let mut rest = data.as_slice();
    for split in splits {
        let n = (split as usize).min(rest.len());
        let (piece, tail) = rest.split_at(n);
        sink.put(piece).unwrap();
        assert!(sink.len() <= sink.capacity());
        rest = tail;
    }
    sink.put(rest).unwrap();
    sink.flush().unwrap();

    // Verify: every byte arrives once, in order
    assert_eq!(*out.borrow(), data);
});
