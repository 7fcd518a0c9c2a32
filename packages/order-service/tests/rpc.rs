//! gRPC integration tests: a real server on an ephemeral port exercised
//! through the generated client.

use std::collections::HashSet;

use orderflow_core::rpc::{
    CreateOrderRequest, GetOrderRequest, ListOrdersRequest, OrderServiceClient,
};
use orderflow_order_service::{OrderServer, ServiceConfig};
use tonic::transport::Channel;

async fn start_server() -> OrderServiceClient<Channel> {
    let mut server = OrderServer::new(ServiceConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..ServiceConfig::default()
    });
    let port = server.start().await.expect("bind");
    tokio::spawn(server.serve(std::future::pending()));

    OrderServiceClient::connect(format!("http://127.0.0.1:{port}"))
        .await
        .expect("connect")
}

#[tokio::test]
async fn create_then_get_round_trip() {
    let mut client = start_server().await;

    let created = client
        .create_order(CreateOrderRequest {
            product_id: "p1".to_string(),
            quantity: 4,
        })
        .await
        .unwrap()
        .into_inner()
        .order
        .expect("create returns the order");

    assert_eq!(created.product_id, "p1");
    assert_eq!(created.quantity, 4);
    assert_eq!(created.status, "pending");
    assert!(created.created_at.is_some());

    let fetched = client
        .get_order(GetOrderRequest {
            id: created.id.clone(),
        })
        .await
        .unwrap()
        .into_inner()
        .order
        .expect("stored order is found");

    assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_unknown_id_is_absent_with_ok_status() {
    let mut client = start_server().await;

    let resp = client
        .get_order(GetOrderRequest {
            id: "never-created".to_string(),
        })
        .await
        .expect("absence is not an error status")
        .into_inner();

    assert!(resp.order.is_none());
}

#[tokio::test]
async fn list_orders_with_and_without_filter() {
    let mut client = start_server().await;

    let mut created_ids = HashSet::new();
    for (product, quantity) in [("p1", 1), ("p2", 2), ("p1", 3)] {
        let order = client
            .create_order(CreateOrderRequest {
                product_id: product.to_string(),
                quantity,
            })
            .await
            .unwrap()
            .into_inner()
            .order
            .unwrap();
        created_ids.insert(order.id);
    }

    let all = client
        .list_orders(ListOrdersRequest {
            product_id: String::new(),
        })
        .await
        .unwrap()
        .into_inner();
    let listed_ids: HashSet<String> = all.orders.into_iter().map(|o| o.id).collect();
    assert_eq!(listed_ids, created_ids);

    let p2 = client
        .list_orders(ListOrdersRequest {
            product_id: "p2".to_string(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(p2.orders.len(), 1);
    assert_eq!(p2.orders[0].product_id, "p2");
    assert_eq!(p2.orders[0].quantity, 2);
}

#[tokio::test]
async fn concurrent_creates_produce_distinct_ids() {
    let client = start_server().await;
    let calls = 16;

    let mut tasks = Vec::new();
    for i in 0..calls {
        let mut client = client.clone();
        tasks.push(tokio::spawn(async move {
            client
                .create_order(CreateOrderRequest {
                    product_id: format!("p{}", i % 4),
                    quantity: 1,
                })
                .await
                .unwrap()
                .into_inner()
                .order
                .unwrap()
                .id
        }));
    }

    let mut ids = HashSet::new();
    for task in tasks {
        assert!(ids.insert(task.await.unwrap()), "duplicate order id");
    }
    assert_eq!(ids.len(), calls);

    let mut client = client;
    let all = client
        .list_orders(ListOrdersRequest {
            product_id: String::new(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(all.orders.len(), calls);
}
