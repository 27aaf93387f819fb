//! Generates the `toll.Aggregator` service stubs.
//!
//! Messages are declared by hand with `prost` derives in `src/proto.rs`, so the
//! service is described with the manual builder and no `protoc` is required.

use tonic_build::manual::{Builder, Method, Service};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let aggregator = Service::builder()
        .name("Aggregator")
        .package("toll")
        .method(
            Method::builder()
                .name("aggregate")
                .route_name("Aggregate")
                .input_type("crate::proto::AggregateRequest")
                .output_type("crate::proto::Empty")
                .codec_path("tonic::codec::ProstCodec")
                .build(),
        )
        .method(
            Method::builder()
                .name("get_invoice")
                .route_name("GetInvoice")
                .input_type("crate::proto::GetInvoiceRequest")
                .output_type("crate::proto::Invoice")
                .codec_path("tonic::codec::ProstCodec")
                .build(),
        )
        .build();

    Builder::new().compile(&[aggregator]);
}
