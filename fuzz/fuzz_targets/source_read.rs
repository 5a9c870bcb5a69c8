#![no_main]

use libfuzzer_sys::fuzz_target;
use packbuf::{SourceBuffer, StaticSource};

fuzz_target!(|input: (u8, u8, Vec<u8>, Vec<u8>)| {
    let (capacity, feed, reads, data) = input;
    let capacity = capacity as usize + 1;
    let feed = feed as usize + 1;

    let mut offset = 0;
    let stream = data.clone();
    let mut source = SourceBuffer::streaming(capacity, move |dst: &mut [u8]| -> std::io::Result<usize> {
        let n = feed.min(dst.len()).min(stream.len() - offset);
        dst[..n].copy_from_slice(&stream[offset..offset + n]);
        offset += n;
        Ok(n)
    });

    // Verify: reads of any size reproduce the stream prefix
    let mut consumed = Vec::new();
    for n in reads {
        let mut dst = vec![0u8; n as usize];
        let got = source.read(&mut dst).unwrap();
        assert!(got <= dst.len());
        assert!(source.position() <= source.available());
        assert!(source.available() <= source.capacity());
        consumed.extend_from_slice(&dst[..got]);
    }
    assert_eq!(consumed.as_slice(), &data[..consumed.len()]);

    // Verify: a static source over the same bytes never grows
    let mut fixed = StaticSource::from_slice(&data);
    let mut all = vec![0u8; data.len()];
    if !data.is_empty() {
        fixed.read_exact(&mut all).unwrap();
        assert_eq!(all, data);
    }
    assert!(fixed.refill(0).is_err());
    assert_eq!(fixed.available(), data.len());
});
