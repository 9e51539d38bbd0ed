#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate brarchive_core;

fuzz_target!(|data: &[u8]| {
    if let Ok(view) = brarchive_core::parse(data) {
        for entry in view.entries().take(1024).flatten() {
            let _contents = entry.contents();
        }
    }
});
