fn main() {
    // Manual service definition: the message structs carry prost derives
    // directly, so no .proto file (and no protoc) is needed.
    let service = tonic_build::manual::Service::builder()
        .name("OrderService")
        .package("orderflow.v1")
        .method(
            tonic_build::manual::Method::builder()
                .name("create_order")
                .route_name("CreateOrder")
                .input_type("crate::rpc::CreateOrderRequest")
                .output_type("crate::rpc::CreateOrderResponse")
                .codec_path("tonic::codec::ProstCodec")
                .build(),
        )
        .method(
            tonic_build::manual::Method::builder()
                .name("get_order")
                .route_name("GetOrder")
                .input_type("crate::rpc::GetOrderRequest")
                .output_type("crate::rpc::GetOrderResponse")
                .codec_path("tonic::codec::ProstCodec")
                .build(),
        )
        .method(
            tonic_build::manual::Method::builder()
                .name("list_orders")
                .route_name("ListOrders")
                .input_type("crate::rpc::ListOrdersRequest")
                .output_type("crate::rpc::ListOrdersResponse")
                .codec_path("tonic::codec::ProstCodec")
                .build(),
        )
        .build();

    tonic_build::manual::Builder::new().compile(&[service]);
}
